//! Animation groups: the named, playable unit of the studio.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::frames::FrameSet;

/// Stable group identifier, unique per creation.
///
/// Ids look like `Sheet_5f0c…` and only contain `[A-Za-z0-9_-]`, so they can
/// be used directly as storage keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Mint a fresh id with the given prefix.
    pub fn generate(prefix: &str) -> Self {
        let prefix = sanitize_key(prefix);
        let prefix = if prefix.is_empty() { "Group".to_string() } else { prefix };
        GroupId(format!("{}_{}", prefix, Uuid::new_v4().simple()))
    }

    /// Wrap an existing id string (e.g. one typed on the command line).
    ///
    /// Returns `None` if the string would not be a safe storage key.
    pub fn parse(s: &str) -> Option<Self> {
        if !s.is_empty() && s.chars().all(is_key_char) {
            Some(GroupId(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Replace anything outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_key(s: &str) -> String {
    s.chars().map(|c| if is_key_char(c) { c } else { '_' }).collect()
}

/// Grid used to cut a sheet into frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceConfig {
    pub rows: u32,
    pub cols: u32,
}

impl SliceConfig {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Number of frames the grid produces.
    pub fn frame_count(&self) -> u32 {
        self.rows * self.cols
    }
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self { rows: 1, cols: 6 }
    }
}

impl fmt::Display for SliceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A named sequence of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationGroup {
    pub id: GroupId,
    pub name: String,
    frames: FrameSet,
    slice_config: Option<SliceConfig>,
    /// Creation time in unix milliseconds.
    pub created_at: u64,
}

impl AnimationGroup {
    pub fn new(id: GroupId, name: impl Into<String>, frames: FrameSet, slice_config: Option<SliceConfig>) -> Self {
        Self {
            id,
            name: name.into(),
            frames,
            slice_config,
            created_at: now_millis(),
        }
    }

    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    pub fn slice_config(&self) -> Option<SliceConfig> {
        self.slice_config
    }

    /// Swap in a new frame set and slice grid together.
    pub fn replace_frames(&mut self, frames: FrameSet, slice_config: Option<SliceConfig>) {
        self.frames = frames;
        self.slice_config = slice_config;
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Current time in unix milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_safe() {
        let a = GroupId::generate("Sheet");
        let b = GroupId::generate("Sheet");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("Sheet_"));
        assert!(GroupId::parse(a.as_str()).is_some());
    }

    #[test]
    fn test_generate_sanitizes_prefix() {
        let id = GroupId::generate("walk cycle/../x");
        assert!(id.as_str().starts_with("walk_cycle____x_"));
        assert!(GroupId::generate("").as_str().starts_with("Group_"));
    }

    #[test]
    fn test_parse_rejects_path_characters() {
        assert!(GroupId::parse("../etc").is_none());
        assert!(GroupId::parse("").is_none());
        assert!(GroupId::parse("Pixel_abc-1").is_some());
    }

    #[test]
    fn test_slice_config_defaults() {
        let config = SliceConfig::default();
        assert_eq!((config.rows, config.cols), (1, 6));
        assert_eq!(config.frame_count(), 6);
        assert_eq!(config.to_string(), "1x6");
    }
}
