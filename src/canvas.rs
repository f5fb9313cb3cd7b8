//! Raster canvas: the square pixel buffer being edited, its undo history and
//! clipboard.
//!
//! Edits that belong to one gesture (a pen stroke, a move drag) mutate the
//! buffer freely; the editor calls [`RasterCanvas::commit`] once when the
//! gesture ends. `paste`, `reset` and `resize` record history themselves.

use std::collections::VecDeque;

use image::{imageops, Rgba, RgbaImage};
use thiserror::Error;

use crate::color::{opaque, TRANSPARENT};
use crate::fill::flood_fill;

/// Default number of snapshots kept for undo.
pub const DEFAULT_HISTORY_CAP: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    #[error("grid size must be at least 1 (got {0})")]
    InvalidSize(u32),
    #[error("image is empty (0x0 pixels)")]
    EmptyImage,
}

/// Drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
    Bucket,
    Eyedropper,
    Move,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pen => "pen",
            Tool::Eraser => "eraser",
            Tool::Bucket => "bucket",
            Tool::Eyedropper => "eyedropper",
            Tool::Move => "move",
        }
    }

    /// Parse a tool name; `picker` is accepted for the eyedropper.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pen" => Some(Tool::Pen),
            "eraser" => Some(Tool::Eraser),
            "bucket" | "fill" => Some(Tool::Bucket),
            "eyedropper" | "picker" => Some(Tool::Eyedropper),
            "move" => Some(Tool::Move),
            _ => None,
        }
    }
}

/// What a single `paint` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    /// Nothing changed (out of bounds, same color, transparent pick, move tool).
    Unchanged,
    /// At least one pixel changed.
    Changed,
    /// The eyedropper read a visible color.
    Picked(Rgba<u8>),
}

/// Square RGBA pixel buffer with bounded snapshot history.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    buffer: RgbaImage,
    history: VecDeque<RgbaImage>,
    history_cap: usize,
    clipboard: Option<RgbaImage>,
    move_snapshot: Option<RgbaImage>,
}

impl RasterCanvas {
    /// Blank transparent canvas of `grid_size × grid_size` pixels.
    pub fn new(grid_size: u32, history_cap: usize) -> Result<Self, CanvasError> {
        if grid_size == 0 {
            return Err(CanvasError::InvalidSize(grid_size));
        }
        let buffer = RgbaImage::new(grid_size, grid_size);
        let mut canvas = Self {
            history: VecDeque::new(),
            history_cap: history_cap.max(1),
            clipboard: None,
            move_snapshot: None,
            buffer,
        };
        canvas.reseed_history();
        Ok(canvas)
    }

    pub fn grid_size(&self) -> u32 {
        self.buffer.width()
    }

    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Number of history entries (always at least one).
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn has_clipboard(&self) -> bool {
        self.clipboard.is_some()
    }

    fn in_bounds(&self, x: i64, y: i64) -> Option<(u32, u32)> {
        let size = self.grid_size() as i64;
        if x >= 0 && x < size && y >= 0 && y < size {
            Some((x as u32, y as u32))
        } else {
            None
        }
    }

    /// Apply `tool` at pixel `(x, y)`.
    ///
    /// Pen writes an opaque `color`, eraser writes transparent, bucket flood
    /// fills, eyedropper reads. Coordinates outside the buffer do nothing.
    /// The move tool is gesture based and ignored here.
    pub fn paint(&mut self, x: i64, y: i64, tool: Tool, color: Rgba<u8>) -> PaintOutcome {
        let Some((x, y)) = self.in_bounds(x, y) else {
            return PaintOutcome::Unchanged;
        };

        let set = |buffer: &mut RgbaImage, value: Rgba<u8>| {
            if *buffer.get_pixel(x, y) == value {
                PaintOutcome::Unchanged
            } else {
                buffer.put_pixel(x, y, value);
                PaintOutcome::Changed
            }
        };

        match tool {
            Tool::Pen => set(&mut self.buffer, opaque(color)),
            Tool::Eraser => set(&mut self.buffer, TRANSPARENT),
            Tool::Bucket => {
                if flood_fill(&mut self.buffer, x, y, color) > 0 {
                    PaintOutcome::Changed
                } else {
                    PaintOutcome::Unchanged
                }
            }
            Tool::Eyedropper => {
                let pixel = *self.buffer.get_pixel(x, y);
                if pixel.0[3] == 0 {
                    PaintOutcome::Unchanged
                } else {
                    PaintOutcome::Picked(pixel)
                }
            }
            Tool::Move => PaintOutcome::Unchanged,
        }
    }

    /// Record the current buffer as a history entry.
    pub fn commit(&mut self) {
        if self.history.len() >= self.history_cap {
            self.history.pop_front();
        }
        self.history.push_back(self.buffer.clone());
    }

    fn reseed_history(&mut self) {
        self.history.clear();
        self.history.push_back(self.buffer.clone());
    }

    /// Step back one edit. Returns `false` when only the base entry is left.
    pub fn undo(&mut self) -> bool {
        if self.history.len() <= 1 {
            return false;
        }
        self.history.pop_back();
        if let Some(previous) = self.history.back() {
            self.buffer = previous.clone();
        }
        self.move_snapshot = None;
        true
    }

    /// Clear every pixel. Undoable.
    pub fn reset(&mut self) {
        self.buffer = RgbaImage::new(self.grid_size(), self.grid_size());
        self.move_snapshot = None;
        self.commit();
    }

    /// Store the whole buffer in the clipboard.
    pub fn copy(&mut self) {
        self.clipboard = Some(self.buffer.clone());
    }

    /// Write the clipboard back at the origin, replacing pixels it covers.
    ///
    /// Returns `false` when the clipboard is empty.
    pub fn paste(&mut self) -> bool {
        let Some(clip) = &self.clipboard else {
            return false;
        };
        imageops::replace(&mut self.buffer, clip, 0, 0);
        self.commit();
        true
    }

    /// Start over with a blank `grid_size × grid_size` buffer. Destroys the
    /// current pixels and history; the clipboard survives.
    pub fn resize(&mut self, grid_size: u32) -> Result<(), CanvasError> {
        if grid_size == 0 {
            return Err(CanvasError::InvalidSize(grid_size));
        }
        self.buffer = RgbaImage::new(grid_size, grid_size);
        self.move_snapshot = None;
        self.reseed_history();
        Ok(())
    }

    /// Replace the canvas with an imported image. The grid grows to the larger
    /// image side and the image is drawn at the origin.
    pub fn load_image(&mut self, image: &RgbaImage) -> Result<(), CanvasError> {
        let size = image.width().max(image.height());
        if size == 0 {
            return Err(CanvasError::EmptyImage);
        }
        let mut buffer = RgbaImage::new(size, size);
        imageops::replace(&mut buffer, image, 0, 0);
        self.buffer = buffer;
        self.move_snapshot = None;
        self.reseed_history();
        Ok(())
    }

    /// Capture the buffer at the start of a move gesture.
    pub fn begin_move(&mut self) {
        self.move_snapshot = Some(self.buffer.clone());
    }

    /// Redraw the gesture-start snapshot shifted by `(dx, dy)` pixels.
    ///
    /// The offset is absolute relative to the gesture start, never cumulative.
    pub fn move_to(&mut self, dx: i64, dy: i64) {
        if let Some(snapshot) = &self.move_snapshot {
            self.buffer = translate(snapshot, dx, dy);
        }
    }

    /// Finish a move gesture. Commits if the pixels actually moved.
    pub fn end_move(&mut self) -> bool {
        let Some(snapshot) = self.move_snapshot.take() else {
            return false;
        };
        let moved = snapshot.as_raw() != self.buffer.as_raw();
        if moved {
            self.commit();
        }
        moved
    }
}

/// Copy of `image` shifted by `(dx, dy)`; pixels pushed past an edge are
/// dropped and uncovered pixels are transparent.
pub fn translate(image: &RgbaImage, dx: i64, dy: i64) -> RgbaImage {
    let mut out = RgbaImage::new(image.width(), image.height());
    imageops::replace(&mut out, image, dx, dy);
    out
}
