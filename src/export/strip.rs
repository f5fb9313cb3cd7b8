//! Strip export - all frames of a group side by side in playback order

use std::path::Path;

use image::{imageops, RgbaImage};

use super::ExportError;
use crate::color::TRANSPARENT;
use crate::group::AnimationGroup;
use crate::output::save_png;

/// Concatenate frames left to right at native resolution.
///
/// Frames smaller than the tallest or widest one are padded with
/// transparent pixels, anchored at their cell's top-left corner.
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use pixelstudio::export::render_strip;
///
/// let frame = RgbaImage::from_pixel(2, 3, Rgba([255, 0, 0, 255]));
/// let strip = render_strip(&[&frame, &frame, &frame, &frame]).unwrap();
/// assert_eq!(strip.dimensions(), (8, 3));
/// ```
pub fn render_strip(frames: &[&RgbaImage]) -> Result<RgbaImage, ExportError> {
    if frames.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let cell_w = frames.iter().map(|f| f.width()).max().unwrap_or(1);
    let cell_h = frames.iter().map(|f| f.height()).max().unwrap_or(1);

    let mut strip = RgbaImage::from_pixel(cell_w * frames.len() as u32, cell_h, TRANSPARENT);
    for (i, frame) in frames.iter().enumerate() {
        imageops::replace(&mut strip, *frame, i as i64 * cell_w as i64, 0);
    }
    Ok(strip)
}

/// Write a group's strip to `path` as PNG.
pub fn export_strip(group: &AnimationGroup, path: &Path) -> Result<(u32, u32), ExportError> {
    let frames: Vec<&RgbaImage> = group.frames().images().collect();
    let strip = render_strip(&frames)?;
    save_png(&strip, path)?;
    tracing::info!(id = %group.id, frames = frames.len(), path = %path.display(), "exported strip");
    Ok(strip.dimensions())
}
