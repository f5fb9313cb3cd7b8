//! Frame buffers and their render handles
//!
//! A [`FrameBuffer`] is the persisted form of one animation frame (encoded
//! PNG bytes). A [`RenderHandle`] is the decoded, drawable form. The two only
//! ever travel together inside a [`FrameSet`], whose constructors are the
//! single place either list is built, so index `i` of both always describes
//! the same pixels.

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use thiserror::Error;

/// Errors produced while building a frame set.
#[derive(Debug, Error)]
pub enum FrameError {
    /// A frame buffer could not be decoded.
    #[error("frame {index}: cannot decode image data: {source}")]
    Decode {
        index: usize,
        #[source]
        source: image::ImageError,
    },
    /// A frame could not be encoded for storage.
    #[error("frame {index}: cannot encode image data: {source}")]
    Encode {
        index: usize,
        #[source]
        source: image::ImageError,
    },
    /// A frame has zero width or height.
    #[error("frame {index} is empty (0x0 pixels)")]
    Empty { index: usize },
}

/// Raw binary image data for one frame, as it is stored on disk.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer(Vec<u8>);

impl FrameBuffer {
    /// Encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of encoded bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({} bytes)", self.0.len())
    }
}

/// Decoded RGBA texture for drawing. Cloning shares the pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderHandle(Arc<RgbaImage>);

impl RenderHandle {
    pub fn image(&self) -> &RgbaImage {
        &self.0
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }
}

/// Index-aligned frame buffers and render handles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSet {
    buffers: Vec<FrameBuffer>,
    handles: Vec<RenderHandle>,
}

impl FrameSet {
    /// Build a frame set from decoded images, encoding each one as PNG.
    pub fn from_images(images: Vec<RgbaImage>) -> Result<Self, FrameError> {
        let mut buffers = Vec::with_capacity(images.len());
        let mut handles = Vec::with_capacity(images.len());

        for (index, image) in images.into_iter().enumerate() {
            if image.width() == 0 || image.height() == 0 {
                return Err(FrameError::Empty { index });
            }
            buffers.push(encode_png(&image).map_err(|source| FrameError::Encode { index, source })?);
            handles.push(RenderHandle(Arc::new(image)));
        }

        Ok(Self { buffers, handles })
    }

    /// Build a frame set from stored bytes, decoding each buffer.
    ///
    /// The original bytes are kept as-is, so saving the set again writes back
    /// exactly what was loaded.
    pub fn from_encoded(encoded: Vec<Vec<u8>>) -> Result<Self, FrameError> {
        let mut buffers = Vec::with_capacity(encoded.len());
        let mut handles = Vec::with_capacity(encoded.len());

        for (index, bytes) in encoded.into_iter().enumerate() {
            let image = image::load_from_memory(&bytes)
                .map_err(|source| FrameError::Decode { index, source })?
                .to_rgba8();
            if image.width() == 0 || image.height() == 0 {
                return Err(FrameError::Empty { index });
            }
            buffers.push(FrameBuffer(bytes));
            handles.push(RenderHandle(Arc::new(image)));
        }

        Ok(Self { buffers, handles })
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn buffers(&self) -> &[FrameBuffer] {
        &self.buffers
    }

    pub fn handles(&self) -> &[RenderHandle] {
        &self.handles
    }

    /// Decoded images in playback order.
    pub fn images(&self) -> impl Iterator<Item = &RgbaImage> {
        self.handles.iter().map(RenderHandle::image)
    }

    /// Dimensions of the first frame, if any.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.handles.first().map(|h| (h.width(), h.height()))
    }
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<FrameBuffer, image::ImageError> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image.clone()).write_to(&mut cursor, ImageOutputFormat::Png)?;
    Ok(FrameBuffer(cursor.into_inner()))
}
