//! File output helpers shared by every export path

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::group::sanitize_key;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save an RGBA image to a PNG file, creating parent directories.
///
/// # Arguments
///
/// * `image` - The image to save
/// * `path` - The output file path
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Write already encoded bytes, creating parent directories.
pub fn write_bytes(bytes: &[u8], path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Choose where an export lands.
///
/// | Scenario            | Output                     |
/// |---------------------|----------------------------|
/// | no `-o`             | `{name}_{kind}.{ext}`      |
/// | `-o out.gif`        | `out.gif`                  |
/// | `-o dir/`           | `dir/{name}_{kind}.{ext}`  |
///
/// `name` is sanitized so it is always a single path component.
pub fn output_path(name: &str, kind: &str, ext: &str, output_arg: Option<&Path>) -> PathBuf {
    let file = format!("{}_{}.{}", sanitize_key(name), kind, ext);
    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(file)
            } else {
                output.to_path_buf()
            }
        }
        None => PathBuf::from(file),
    }
}
