//! GIF animation export
//!
//! All frames share one canvas the size of the first frame times the export
//! scale. A frame of a different size is scaled to fit inside it, keeping its
//! aspect ratio, and centered on a transparent background.

use std::io::Write;
use std::path::Path;

use image::{imageops, RgbaImage};

use super::ExportError;
use crate::group::AnimationGroup;

/// Settings for one GIF export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GifOptions {
    /// Playback rate; each frame is shown for `1/fps` seconds.
    pub fps: u32,
    /// Output size relative to the first frame.
    pub scale: f64,
    pub looping: bool,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self { fps: 12, scale: 1.0, looping: true }
    }
}

/// Build the shared-size frames that go into the GIF.
///
/// # Arguments
///
/// * `frames` - Frames in playback order
/// * `scale` - Canvas size relative to the first frame (nearest-neighbor)
pub fn gif_frames(frames: &[&RgbaImage], scale: f64) -> Result<Vec<RgbaImage>, ExportError> {
    let Some(first) = frames.first() else {
        return Err(ExportError::NothingToExport);
    };
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let canvas_w = ((first.width() as f64 * scale).round() as u32).max(1);
    let canvas_h = ((first.height() as f64 * scale).round() as u32).max(1);

    Ok(frames.iter().map(|frame| letterbox(frame, canvas_w, canvas_h)).collect())
}

fn letterbox(frame: &RgbaImage, canvas_w: u32, canvas_h: u32) -> RgbaImage {
    let fit = (canvas_w as f64 / frame.width() as f64).min(canvas_h as f64 / frame.height() as f64);
    let w = ((frame.width() as f64 * fit).round() as u32).clamp(1, canvas_w);
    let h = ((frame.height() as f64 * fit).round() as u32).clamp(1, canvas_h);

    let scaled = if (w, h) == frame.dimensions() {
        frame.clone()
    } else {
        imageops::resize(frame, w, h, imageops::FilterType::Nearest)
    };
    if (w, h) == (canvas_w, canvas_h) {
        return scaled;
    }

    let mut canvas = RgbaImage::new(canvas_w, canvas_h);
    let x = (canvas_w - w) / 2;
    let y = (canvas_h - h) / 2;
    imageops::replace(&mut canvas, &scaled, x as i64, y as i64);
    canvas
}

/// Encode frames as an animated GIF into `writer`.
#[cfg(feature = "gif")]
pub fn encode_gif<W: Write>(frames: Vec<RgbaImage>, options: &GifOptions, writer: W) -> Result<(), ExportError> {
    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Delay, Frame};

    if frames.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut encoder = GifEncoder::new(writer);
    let repeat = if options.looping { Repeat::Infinite } else { Repeat::Finite(0) };
    encoder.set_repeat(repeat)?;

    let fps = options.fps.clamp(1, 60);
    for image in frames {
        let delay = Delay::from_numer_denom_ms(1000, fps);
        encoder.encode_frame(Frame::from_parts(image, 0, 0, delay))?;
    }
    Ok(())
}

/// Without the `gif` feature there is no encoder to hand frames to.
#[cfg(not(feature = "gif"))]
pub fn encode_gif<W: Write>(_frames: Vec<RgbaImage>, _options: &GifOptions, _writer: W) -> Result<(), ExportError> {
    Err(ExportError::EncoderUnavailable)
}

/// Export a group as a GIF file.
///
/// Nothing is written when the group is empty or the encoder is missing.
pub fn export_gif(group: &AnimationGroup, options: &GifOptions, path: &Path) -> Result<(u32, u32), ExportError> {
    if !cfg!(feature = "gif") {
        return Err(ExportError::EncoderUnavailable);
    }

    let frames: Vec<&RgbaImage> = group.frames().images().collect();
    let prepared = gif_frames(&frames, options.scale)?;
    let size = prepared[0].dimensions();

    let mut bytes = Vec::new();
    encode_gif(prepared, options, &mut bytes)?;
    crate::output::write_bytes(&bytes, path)?;

    tracing::info!(
        id = %group.id,
        frames = frames.len(),
        fps = options.fps,
        width = size.0,
        height = size.1,
        path = %path.display(),
        "exported gif"
    );
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::FrameSet;
    use crate::group::GroupId;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_empty_frames_refused() {
        assert!(matches!(gif_frames(&[], 2.0), Err(ExportError::NothingToExport)));
    }

    #[test]
    fn test_canvas_is_first_frame_times_scale() {
        let a = RgbaImage::from_pixel(16, 8, RED);
        let b = RgbaImage::from_pixel(16, 8, RED);
        let frames = gif_frames(&[&a, &b], 2.0).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.dimensions() == (32, 16)));
        assert!(frames[0].pixels().all(|p| *p == RED));
    }

    #[test]
    fn test_mismatched_frame_is_letterboxed() {
        let first = RgbaImage::from_pixel(8, 8, RED);
        let wide = RgbaImage::from_pixel(8, 4, Rgba([0, 0, 255, 255]));
        let frames = gif_frames(&[&first, &wide], 1.0).unwrap();
        let boxed = &frames[1];
        assert_eq!(boxed.dimensions(), (8, 8));
        assert_eq!(boxed.get_pixel(0, 0).0[3], 0);
        assert_eq!(*boxed.get_pixel(0, 2), Rgba([0, 0, 255, 255]));
        assert_eq!(*boxed.get_pixel(7, 5), Rgba([0, 0, 255, 255]));
        assert_eq!(boxed.get_pixel(7, 6).0[3], 0);
    }

    #[test]
    fn test_nearest_neighbor_keeps_hard_edges() {
        let mut frame = RgbaImage::new(2, 1);
        frame.put_pixel(0, 0, RED);
        frame.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        let frames = gif_frames(&[&frame], 4.0).unwrap();
        assert_eq!(frames[0].dimensions(), (8, 4));
        assert_eq!(*frames[0].get_pixel(3, 3), RED);
        assert_eq!(*frames[0].get_pixel(4, 0), Rgba([0, 255, 0, 255]));
    }

    #[cfg(feature = "gif")]
    #[test]
    fn test_export_gif_decodes_back() {
        use image::AnimationDecoder;

        let temp = tempfile::TempDir::new().expect("should create temp dir");
        let images = (0..3).map(|i| RgbaImage::from_pixel(4, 4, Rgba([i * 100, 0, 0, 255]))).collect();
        let group = AnimationGroup::new(GroupId::generate("Sheet"), "g", FrameSet::from_images(images).unwrap(), None);

        let path = temp.path().join("out").join("g.gif");
        let options = GifOptions { fps: 10, scale: 2.0, looping: true };
        assert_eq!(export_gif(&group, &options, &path).unwrap(), (8, 8));

        let file = std::fs::File::open(&path).expect("should open gif");
        let decoder = image::codecs::gif::GifDecoder::new(std::io::BufReader::new(file)).expect("should decode gif");
        let frames = decoder.into_frames().collect_frames().expect("should read frames");
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].buffer().dimensions(), (8, 8));
        let (numer, denom) = frames[0].delay().numer_denom_ms();
        assert_eq!(numer / denom, 100);
    }

    #[cfg(feature = "gif")]
    #[test]
    fn test_export_empty_group_writes_nothing() {
        let temp = tempfile::TempDir::new().expect("should create temp dir");
        let group = AnimationGroup::new(GroupId::generate("Sheet"), "empty", FrameSet::default(), None);
        let path = temp.path().join("empty.gif");
        assert!(matches!(export_gif(&group, &GifOptions::default(), &path), Err(ExportError::NothingToExport)));
        assert!(!path.exists());
    }

    #[cfg(not(feature = "gif"))]
    #[test]
    fn test_encoder_unavailable_without_feature() {
        let group = AnimationGroup::new(GroupId::generate("Sheet"), "g", FrameSet::default(), None);
        let path = std::path::PathBuf::from("never-written.gif");
        assert!(matches!(export_gif(&group, &GifOptions::default(), &path), Err(ExportError::EncoderUnavailable)));
    }
}
