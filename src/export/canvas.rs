//! Drawing-canvas export in three variants.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use image::{imageops, DynamicImage, ImageOutputFormat, RgbaImage};

use super::ExportError;
use crate::color::WHITE;
use crate::output::write_bytes;

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasFormat {
    /// PNG keeping transparency.
    #[default]
    PngTransparent,
    /// PNG flattened over opaque white.
    PngOpaque,
    /// JPEG flattened over opaque white.
    Jpeg,
}

impl CanvasFormat {
    pub fn from_name(name: &str) -> Result<Self, ExportError> {
        match name.to_ascii_lowercase().as_str() {
            "png" | "png-transparent" | "png-trans" => Ok(CanvasFormat::PngTransparent),
            "png-opaque" | "png-white" => Ok(CanvasFormat::PngOpaque),
            "jpg" | "jpeg" => Ok(CanvasFormat::Jpeg),
            _ => Err(ExportError::UnknownFormat(name.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            CanvasFormat::PngTransparent | CanvasFormat::PngOpaque => "png",
            CanvasFormat::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for CanvasFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CanvasFormat::PngTransparent => "png",
            CanvasFormat::PngOpaque => "png-opaque",
            CanvasFormat::Jpeg => "jpeg",
        };
        f.write_str(name)
    }
}

/// Alpha-composite `image` over opaque white.
pub fn flatten_on_white(image: &RgbaImage) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(image.width(), image.height(), WHITE);
    imageops::overlay(&mut out, image, 0, 0);
    out
}

/// Encode the canvas in memory.
pub fn encode_canvas(image: &RgbaImage, format: CanvasFormat, jpeg_quality: u8) -> Result<Vec<u8>, ExportError> {
    let mut cursor = Cursor::new(Vec::new());
    match format {
        CanvasFormat::PngTransparent => {
            DynamicImage::ImageRgba8(image.clone()).write_to(&mut cursor, ImageOutputFormat::Png)?;
        }
        CanvasFormat::PngOpaque => {
            DynamicImage::ImageRgba8(flatten_on_white(image)).write_to(&mut cursor, ImageOutputFormat::Png)?;
        }
        CanvasFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(flatten_on_white(image)).to_rgb8();
            let quality = jpeg_quality.clamp(1, 100);
            DynamicImage::ImageRgb8(rgb).write_to(&mut cursor, ImageOutputFormat::Jpeg(quality))?;
        }
    }
    Ok(cursor.into_inner())
}

/// Encode the canvas and write it to `path`.
pub fn export_canvas(image: &RgbaImage, format: CanvasFormat, jpeg_quality: u8, path: &Path) -> Result<(), ExportError> {
    let bytes = encode_canvas(image, format, jpeg_quality)?;
    write_bytes(&bytes, path)?;
    tracing::info!(%format, path = %path.display(), bytes = bytes.len(), "exported canvas");
    Ok(())
}
