//! Export pipeline.
//!
//! Turns a group's frames, or the drawing canvas, into files:
//!
//! - **Strip**: every frame side by side at native resolution, as PNG
//! - **GIF**: looping animation at the sprite's rate and scale
//! - **Canvas**: the drawing as transparent PNG, PNG on white, or JPEG
//!
//! Exports only read from their inputs.

pub mod canvas;
pub mod gif;
pub mod strip;

pub use canvas::{encode_canvas, export_canvas, CanvasFormat};
pub use gif::{encode_gif, export_gif, gif_frames, GifOptions};
pub use strip::{export_strip, render_strip};

use thiserror::Error;

use crate::output::OutputError;

/// Error type for export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The animated image encoder is not part of this build.
    #[error("GIF encoder is not available in this build")]
    EncoderUnavailable,
    /// The group has no frames.
    #[error("nothing to export: the frame list is empty")]
    NothingToExport,
    #[error("unknown canvas format '{0}' (expected png, png-opaque or jpeg)")]
    UnknownFormat(String),
    #[error(transparent)]
    Output(#[from] OutputError),
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Output(OutputError::Image(e))
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Output(OutputError::Io(e))
    }
}
