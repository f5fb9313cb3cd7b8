//! Sprite sheet slicing - cuts a source image into a grid of frames
//!
//! Every frame has the same size, `⌊W/cols⌋ × ⌊H/rows⌋`. Frame `(r, c)`
//! starts at `(⌊c·W/cols⌋, ⌊r·H/rows⌋)`, so neighbouring frames never overlap
//! and the only source pixels left out are the rounding remainder.

use image::imageops;
use image::RgbaImage;
use thiserror::Error;

use crate::frames::{FrameError, FrameSet};
use crate::group::SliceConfig;

/// Error type for slicing
#[derive(Debug, Error)]
pub enum SliceError {
    /// Rows or columns set to zero
    #[error("slice grid must have at least one row and one column (got {0})")]
    EmptyGrid(SliceConfig),
    /// Grid has more cells than the image has pixels along an axis
    #[error("{width}x{height} image is too small for a {grid} grid")]
    GridTooFine { width: u32, height: u32, grid: SliceConfig },
    /// Frame encoding failed
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Pixel rectangle of one frame within the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the source rectangles for a grid, row-major.
pub fn frame_rects(width: u32, height: u32, grid: SliceConfig) -> Result<Vec<FrameRect>, SliceError> {
    if grid.rows == 0 || grid.cols == 0 {
        return Err(SliceError::EmptyGrid(grid));
    }

    let frame_w = width / grid.cols;
    let frame_h = height / grid.rows;
    if frame_w == 0 || frame_h == 0 {
        return Err(SliceError::GridTooFine { width, height, grid });
    }

    let mut rects = Vec::with_capacity(grid.frame_count() as usize);
    for row in 0..grid.rows {
        // u64 so that `index * extent` cannot overflow for large sheets
        let y = (row as u64 * height as u64 / grid.rows as u64) as u32;
        for col in 0..grid.cols {
            let x = (col as u64 * width as u64 / grid.cols as u64) as u32;
            rects.push(FrameRect { x, y, width: frame_w, height: frame_h });
        }
    }
    Ok(rects)
}

/// Cut `image` into `rows × cols` frame images, row-major.
pub fn slice_images(image: &RgbaImage, grid: SliceConfig) -> Result<Vec<RgbaImage>, SliceError> {
    let rects = frame_rects(image.width(), image.height(), grid)?;
    Ok(rects
        .iter()
        .map(|r| imageops::crop_imm(image, r.x, r.y, r.width, r.height).to_image())
        .collect())
}

/// Cut `image` into a frame set: render handles for playback plus encoded
/// buffers for storage, produced together.
///
/// Nothing is returned unless every frame was produced, so callers can
/// replace a group's frames with the result without partial updates.
pub fn slice(image: &RgbaImage, grid: SliceConfig) -> Result<FrameSet, SliceError> {
    let images = slice_images(image, grid)?;
    let frames = FrameSet::from_images(images)?;
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        %grid,
        frames = frames.len(),
        "sliced sheet"
    );
    Ok(frames)
}
