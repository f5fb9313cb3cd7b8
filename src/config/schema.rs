//! Configuration schema types for `pixelstudio.toml`
//!
//! Every section and field is optional; missing values fall back to the
//! defaults below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::color::parse_color;
use crate::editor::{EditorSettings, DEFAULT_RECENT_CAP};
use crate::export::gif::GifOptions;
use crate::group::SliceConfig;
use crate::runtime::{PlaybackSettings, MAX_FPS, MIN_FPS};

/// Root of `pixelstudio.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub store: StoreConfig,
    pub canvas: CanvasConfig,
    pub playback: PlaybackConfig,
    pub slice: SliceDefaults,
    pub export: ExportConfig,
}

/// Where group records live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store directory, relative to the working directory
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { dir: default_store_dir() }
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".pixelstudio/store")
}

/// Drawing canvas defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    /// Undo snapshots kept
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    #[serde(default = "default_recent_colors")]
    pub recent_colors: usize,
    /// Starting pen color (any CSS color)
    #[serde(default = "default_color")]
    pub color: String,
    /// Screen size of the canvas at zoom 1
    #[serde(default = "default_display_size")]
    pub display_size: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            history_cap: default_history_cap(),
            recent_colors: default_recent_colors(),
            color: default_color(),
            display_size: default_display_size(),
        }
    }
}

fn default_grid_size() -> u32 {
    32
}

fn default_history_cap() -> usize {
    crate::canvas::DEFAULT_HISTORY_CAP
}

fn default_recent_colors() -> usize {
    DEFAULT_RECENT_CAP
}

fn default_color() -> String {
    "#3b82f6".to_string()
}

fn default_display_size() -> f64 {
    512.0
}

impl CanvasConfig {
    pub fn editor_settings(&self) -> EditorSettings {
        let defaults = EditorSettings::default();
        EditorSettings {
            grid_size: self.grid_size,
            history_cap: self.history_cap,
            recent_cap: self.recent_colors,
            color: parse_color(&self.color).unwrap_or(defaults.color),
            display_size: self.display_size,
        }
    }
}

/// Animation playback defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Initial scale of new sprites
    #[serde(default = "default_playback_scale")]
    pub scale: f64,
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    #[serde(default = "default_true", rename = "loop")]
    pub looping: bool,
    /// Rendered view size [width, height]
    #[serde(default = "default_view")]
    pub view: [u32; 2],
    #[serde(default = "default_background")]
    pub background: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            scale: default_playback_scale(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            looping: default_true(),
            view: default_view(),
            background: default_background(),
        }
    }
}

fn default_fps() -> u32 {
    12
}

fn default_playback_scale() -> f64 {
    2.0
}

fn default_min_scale() -> f64 {
    0.1
}

fn default_max_scale() -> f64 {
    20.0
}

fn default_true() -> bool {
    true
}

fn default_view() -> [u32; 2] {
    [800, 600]
}

fn default_background() -> String {
    "#18181b".to_string()
}

impl PlaybackConfig {
    pub fn settings(&self) -> PlaybackSettings {
        let defaults = PlaybackSettings::default();
        PlaybackSettings {
            fps: self.fps,
            scale: self.scale,
            min_scale: self.min_scale,
            max_scale: self.max_scale,
            looping: self.looping,
            view: (self.view[0], self.view[1]),
            background: parse_color(&self.background).unwrap_or(defaults.background),
        }
    }
}

/// Grid used when slicing a single imported sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceDefaults {
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default = "default_cols")]
    pub cols: u32,
}

impl Default for SliceDefaults {
    fn default() -> Self {
        Self { rows: default_rows(), cols: default_cols() }
    }
}

fn default_rows() -> u32 {
    1
}

fn default_cols() -> u32 {
    6
}

impl SliceDefaults {
    pub fn grid(&self) -> SliceConfig {
        SliceConfig::new(self.rows, self.cols)
    }
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// GIF size relative to the first frame
    #[serde(default = "default_gif_scale")]
    pub gif_scale: f64,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { gif_scale: default_gif_scale(), jpeg_quality: default_jpeg_quality() }
    }
}

fn default_gif_scale() -> f64 {
    1.0
}

fn default_jpeg_quality() -> u8 {
    crate::export::canvas::DEFAULT_JPEG_QUALITY
}

impl ExportConfig {
    pub fn gif_options(&self, playback: &PlaybackConfig) -> GifOptions {
        GifOptions { fps: playback.fps, scale: self.gif_scale, looping: playback.looping }
    }
}

/// A single configuration problem
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "playback.fps")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pixelstudio.toml: '{}' {}", self.field, self.message)
    }
}

impl StudioConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigValidationError { field: field.to_string(), message: message.to_string() });
            }
        };

        check(!self.store.dir.as_os_str().is_empty(), "store.dir", "must not be empty");

        check(self.canvas.grid_size > 0, "canvas.grid_size", "must be a positive integer");
        check(self.canvas.history_cap > 0, "canvas.history_cap", "must be a positive integer");
        check(self.canvas.recent_colors > 0, "canvas.recent_colors", "must be a positive integer");
        check(parse_color(&self.canvas.color).is_ok(), "canvas.color", "must be a valid CSS color");
        check(
            self.canvas.display_size.is_finite() && self.canvas.display_size > 0.0,
            "canvas.display_size",
            "must be a positive number",
        );

        check(
            (MIN_FPS..=MAX_FPS).contains(&self.playback.fps),
            "playback.fps",
            "must be between 1 and 60",
        );
        check(
            self.playback.min_scale > 0.0 && self.playback.min_scale <= self.playback.max_scale,
            "playback.min_scale",
            "must be positive and not above playback.max_scale",
        );
        check(
            self.playback.scale >= self.playback.min_scale && self.playback.scale <= self.playback.max_scale,
            "playback.scale",
            "must lie between playback.min_scale and playback.max_scale",
        );
        check(
            self.playback.view[0] > 0 && self.playback.view[1] > 0,
            "playback.view",
            "dimensions must be positive",
        );
        check(parse_color(&self.playback.background).is_ok(), "playback.background", "must be a valid CSS color");

        check(self.slice.rows > 0, "slice.rows", "must be a positive integer");
        check(self.slice.cols > 0, "slice.cols", "must be a positive integer");

        check(
            self.export.gif_scale.is_finite() && self.export.gif_scale > 0.0,
            "export.gif_scale",
            "must be a positive number",
        );
        check(
            (1..=100).contains(&self.export.jpeg_quality),
            "export.jpeg_quality",
            "must be between 1 and 100",
        );

        errors
    }
}
