//! Image import: resolving input paths, decoding files, and grouping numbered
//! frame files into sequences.
//!
//! Sequence grouping works on file names: `walk_01.png`, `walk_02.png` and
//! `walk-3.png` all belong to the `walk` group. Files are ordered with a
//! numeric-aware, case-insensitive comparison so `frame10` sorts after
//! `frame9`.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use glob::{glob, Pattern};
use image::RgbaImage;
use rayon::prelude::*;
use regex::Regex;
use thiserror::Error;

/// Key used when a file name is nothing but a frame number.
pub const DEFAULT_SEQUENCE_KEY: &str = "Sequence";

/// Extensions picked up when a directory is given as input.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Error type for import failures
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{0} is an empty image")]
    Empty(PathBuf),
    #[error("no image files found")]
    NoImages,
    #[error("invalid glob pattern '{0}': {1}")]
    InvalidPattern(String, glob::PatternError),
}

/// A decoded input file.
#[derive(Debug, Clone)]
pub struct ImportedImage {
    pub path: PathBuf,
    pub image: RgbaImage,
}

impl ImportedImage {
    /// File name component, lossy.
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Files that share a group key, in natural order.
#[derive(Debug, Clone)]
pub struct SequenceGroup {
    pub key: String,
    pub images: Vec<ImportedImage>,
}

/// Whether a path has one of the recognised image extensions.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Resolve command-line inputs into image files.
///
/// Files are kept as given. A directory expands to the image files directly
/// inside it, in natural order.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ImportError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        // Brackets and stars in the directory name are literal.
        let dir = Pattern::escape(&input.to_string_lossy());
        let pattern = Path::new(&dir).join("*").to_string_lossy().into_owned();
        let entries = glob(&pattern).map_err(|e| ImportError::InvalidPattern(pattern.clone(), e))?;
        let mut found: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("skipping unreadable path: {}", e);
                    None
                }
            })
            .filter(|path| path.is_file() && is_image_path(path))
            .collect();
        found.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
        files.extend(found);
    }

    if files.is_empty() {
        return Err(ImportError::NoImages);
    }
    Ok(files)
}

/// Decode one image file to RGBA.
pub fn decode_file(path: &Path) -> Result<ImportedImage, ImportError> {
    let bytes = std::fs::read(path).map_err(|source| ImportError::Io { path: path.to_path_buf(), source })?;
    let image = image::load_from_memory(&bytes)
        .map_err(|source| ImportError::Decode { path: path.to_path_buf(), source })?
        .to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(ImportError::Empty(path.to_path_buf()));
    }
    Ok(ImportedImage { path: path.to_path_buf(), image })
}

/// Decode every file, in parallel. Results keep the input order; the first
/// failure aborts the whole import.
pub fn decode_all(paths: &[PathBuf]) -> Result<Vec<ImportedImage>, ImportError> {
    let images = paths.par_iter().map(|path| decode_file(path)).collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = images.len(), "decoded import files");
    Ok(images)
}

fn frame_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[-_]?\d+\.(png|jpe?g)$").expect("frame suffix pattern is valid"))
}

fn image_extension() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.(png|jpe?g)$").expect("extension pattern is valid"))
}

/// Group key for a file name: the name without its trailing frame number
/// and extension.
///
/// # Examples
///
/// ```
/// use pixelstudio::import::group_key;
///
/// assert_eq!(group_key("walk_01.png"), "walk");
/// assert_eq!(group_key("Run-12.JPG"), "Run");
/// assert_eq!(group_key("idle.png"), "idle");
/// assert_eq!(group_key("0003.png"), "Sequence");
/// ```
pub fn group_key(file_name: &str) -> String {
    let key = frame_suffix().replace(file_name, "");
    let key = image_extension().replace(&key, "");
    if key.is_empty() {
        DEFAULT_SEQUENCE_KEY.to_string()
    } else {
        key.into_owned()
    }
}

/// Compare file names the way a person would: case-insensitive, with runs
/// of digits compared by value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_digits(&mut a);
                let right = take_digits(&mut b);
                let ord = compare_digit_runs(&left, &right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Sort images by file name and bucket them by [`group_key`].
///
/// Groups come out in the order their first file appears.
pub fn group_sequences(mut images: Vec<ImportedImage>) -> Vec<SequenceGroup> {
    images.sort_by(|a, b| natural_cmp(&a.file_name(), &b.file_name()));

    let mut groups: Vec<SequenceGroup> = Vec::new();
    for image in images {
        let key = group_key(&image.file_name());
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.images.push(image),
            None => groups.push(SequenceGroup { key, images: vec![image] }),
        }
    }
    groups
}
