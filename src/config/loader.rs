//! Configuration loading and discovery for `pixelstudio.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::StudioConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "pixelstudio.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse pixelstudio.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override store directory
    pub store: Option<PathBuf>,
    /// Override playback rate
    pub fps: Option<u32>,
    /// Override initial sprite scale
    pub scale: Option<f64>,
    /// Override canvas grid size
    pub grid_size: Option<u32>,
    /// Override slice rows
    pub rows: Option<u32>,
    /// Override slice columns
    pub cols: Option<u32>,
}

/// Find pixelstudio.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for pixelstudio.toml
/// 2. Check XDG_CONFIG_HOME/pixelstudio/pixelstudio.toml (or ~/.config/pixelstudio/pixelstudio.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find pixelstudio.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("pixelstudio").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find pixelstudio.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Arguments
/// - `path` - Optional path to a pixelstudio.toml file
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("art/pixelstudio.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<StudioConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "loading config");
            load_config_file(&p)
        }
        None => Ok(default_config()),
    }
}

fn load_config_file(path: &Path) -> Result<StudioConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: StudioConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Configuration used when no pixelstudio.toml is found.
pub fn default_config() -> StudioConfig {
    StudioConfig::default()
}

/// Merge CLI overrides into a configuration, then re-validate.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut StudioConfig, overrides: &CliOverrides) -> Result<(), ConfigError> {
    if let Some(ref store) = overrides.store {
        config.store.dir = store.clone();
    }
    if let Some(fps) = overrides.fps {
        config.playback.fps = fps;
    }
    if let Some(scale) = overrides.scale {
        config.playback.scale = scale;
    }
    if let Some(grid_size) = overrides.grid_size {
        config.canvas.grid_size = grid_size;
    }
    if let Some(rows) = overrides.rows {
        config.slice.rows = rows;
    }
    if let Some(cols) = overrides.cols {
        config.slice.cols = cols;
    }

    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &[u8]) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents)
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[canvas]\ngrid_size = 8");
        let subdir = temp.path().join("art").join("sheets");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        assert_eq!(find_config_from(subdir), Some(config_path.clone()));
        assert_eq!(find_config_from(temp.path().to_path_buf()), Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            br#"
[store]
dir = "data/groups"

[playback]
fps = 24
scale = 3.0

[slice]
rows = 2
cols = 4
"#,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.store.dir, PathBuf::from("data/groups"));
        assert_eq!(config.playback.fps, 24);
        assert_eq!(config.playback.scale, 3.0);
        assert_eq!((config.slice.rows, config.slice.cols), (2, 4));
        assert_eq!(config.canvas.grid_size, 32);
    }

    #[test]
    fn test_load_config_missing_explicit_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"this is not valid toml {{{");
        assert!(matches!(load_config(Some(&config_path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[playback]\nfps = 0\n");
        let err = load_config(Some(&config_path)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref problems) if problems.len() == 1));
        assert!(err.to_string().contains("playback.fps"));
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = default_config();
        let overrides = CliOverrides {
            store: Some(PathBuf::from("elsewhere")),
            fps: Some(30),
            rows: Some(3),
            ..Default::default()
        };
        merge_cli_overrides(&mut config, &overrides).expect("overrides are valid");
        assert_eq!(config.store.dir, PathBuf::from("elsewhere"));
        assert_eq!(config.playback.fps, 30);
        assert_eq!(config.slice.rows, 3);
        assert_eq!(config.slice.cols, 6);
    }

    #[test]
    fn test_merge_cli_overrides_rejects_bad_values() {
        let mut config = default_config();
        let overrides = CliOverrides { fps: Some(100), ..Default::default() };
        assert!(matches!(merge_cli_overrides(&mut config, &overrides), Err(ConfigError::Validation(_))));
    }
}
