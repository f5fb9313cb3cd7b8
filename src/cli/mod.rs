//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations. Every command loads the
//! configuration, applies flag overrides, and works against the store
//! directory it names.

mod draw;
mod export;
mod import;
mod library;
mod play;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, ConfigError, StudioConfig};
use crate::group::GroupId;
use crate::logging::{init_logging, LogConfig};
use crate::store::FsStore;
use crate::studio::{Studio, StudioError};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Pixel Studio - slice sprite sheets, draw pixel art and play animations
#[derive(Parser)]
#[command(name = "pxs")]
#[command(about = "Pixel Studio - slice sprite sheets, draw pixel art and play animations")]
#[command(version)]
pub struct Cli {
    /// Path to pixelstudio.toml (default: discovered from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store directory (overrides [store] dir)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import images: one file is sliced as a sheet, several are grouped into sequences
    Import {
        /// Image files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Sheet rows (single image only; default from config)
        #[arg(long)]
        rows: Option<u32>,

        /// Sheet columns (single image only; default from config)
        #[arg(long)]
        cols: Option<u32>,

        /// Group name
        #[arg(long)]
        name: Option<String>,
    },

    /// List stored groups
    List,

    /// Rename a group
    Rename {
        /// Group id
        id: String,
        /// New name
        name: String,
    },

    /// Delete a group
    Delete {
        /// Group id
        id: String,
    },

    /// Re-cut a group's frames from a sheet
    Reslice {
        /// Group id
        id: String,
        /// Sheet image
        image: PathBuf,
        #[arg(long)]
        rows: u32,
        #[arg(long)]
        cols: u32,
    },

    /// Export a group
    Export {
        #[command(subcommand)]
        target: ExportTarget,
    },

    /// Run an editor script on a blank (or imported) canvas
    Draw {
        /// Script file, one editor command per line
        script: PathBuf,

        /// Canvas grid size (default from config)
        #[arg(long)]
        size: Option<u32>,

        /// Start from this image instead of a blank canvas
        #[arg(long)]
        import: Option<PathBuf>,

        /// Output file or directory for the final canvas
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Canvas format: png, png-opaque or jpeg
        #[arg(long, default_value = "png")]
        format: String,

        /// Also save the final canvas as a group
        #[arg(long)]
        save_group: bool,

        /// Name for saved groups
        #[arg(long)]
        name: Option<String>,
    },

    /// Play groups for a while and write the composed view as PNG
    Play {
        /// Group ids, bottom to top
        #[arg(required = true)]
        ids: Vec<String>,

        /// Seconds of playback to simulate
        #[arg(long, default_value = "1.0")]
        seconds: f64,

        /// Frame rate for the listed groups (default from config)
        #[arg(long)]
        fps: Option<u32>,

        /// Sprite scale for the listed groups (default from config)
        #[arg(long)]
        scale: Option<f64>,

        /// Output PNG file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ExportTarget {
    /// All frames side by side as PNG
    Strip {
        /// Group id
        id: String,
        /// Output file or directory. If omitted: {name}_strip.png
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Looping animated GIF
    Gif {
        /// Group id
        id: String,
        /// Output file or directory. If omitted: {name}_anim.gif
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Frames per second (default from config)
        #[arg(long)]
        fps: Option<u32>,
        /// Size relative to the first frame (default from config)
        #[arg(long)]
        scale: Option<f64>,
    },
}

/// Settings shared by every command once flags are applied.
pub(crate) struct Context {
    pub config: StudioConfig,
}

impl Context {
    /// Open the store and load every group.
    pub fn open_studio(&self) -> Result<Studio<FsStore>, StudioError> {
        let store = FsStore::open(&self.config.store.dir)?;
        Studio::load(store, self.config.playback.settings())
    }
}

/// Parse a group id typed on the command line.
pub(crate) fn parse_id(s: &str) -> Result<GroupId, ExitCode> {
    GroupId::parse(s).ok_or_else(|| {
        eprintln!("Error: '{}' is not a valid group id", s);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

/// Print and drain persistence warnings.
pub(crate) fn report_warnings(studio: &mut Studio<FsStore>) {
    for warning in studio.take_warnings() {
        eprintln!("Warning: {}", warning);
    }
}

/// Exit code for a studio error: unknown ids and bad input are usage errors.
pub(crate) fn studio_failure(e: &StudioError) -> ExitCode {
    eprintln!("Error: {}", e);
    match e {
        StudioError::UnknownGroup(_) | StudioError::EmptyName | StudioError::Slice(_) => {
            ExitCode::from(EXIT_INVALID_ARGS)
        }
        _ => ExitCode::from(EXIT_ERROR),
    }
}

fn overrides(cli: &Cli) -> CliOverrides {
    let mut overrides = CliOverrides { store: cli.store.clone(), ..Default::default() };
    match &cli.command {
        Commands::Import { rows, cols, .. } => {
            overrides.rows = *rows;
            overrides.cols = *cols;
        }
        Commands::Draw { size, .. } => overrides.grid_size = *size,
        Commands::Play { fps, scale, .. } => {
            overrides.fps = *fps;
            overrides.scale = *scale;
        }
        _ => {}
    }
    overrides
}

fn build_context(cli: &Cli) -> Result<Context, ExitCode> {
    let mut config = load_config(cli.config.as_deref()).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })?;
    merge_cli_overrides(&mut config, &overrides(cli)).map_err(|e| {
        eprintln!("Error: {}", e);
        match e {
            ConfigError::Validation(_) => ExitCode::from(EXIT_INVALID_ARGS),
            _ => ExitCode::from(EXIT_ERROR),
        }
    })?;
    Ok(Context { config })
}

/// Run the CLI and return the process exit code.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose, cli.quiet));

    let ctx = match build_context(&cli) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    match cli.command {
        Commands::Import { paths, name, .. } => import::run_import(&ctx, &paths, name.as_deref()),
        Commands::List => library::run_list(&ctx),
        Commands::Rename { id, name } => library::run_rename(&ctx, &id, &name),
        Commands::Delete { id } => library::run_delete(&ctx, &id),
        Commands::Reslice { id, image, rows, cols } => library::run_reslice(&ctx, &id, &image, rows, cols),
        Commands::Export { target } => match target {
            ExportTarget::Strip { id, output } => export::run_strip(&ctx, &id, output.as_deref()),
            ExportTarget::Gif { id, output, fps, scale } => {
                export::run_gif(&ctx, &id, output.as_deref(), fps, scale)
            }
        },
        Commands::Draw { script, import, output, format, save_group, name, .. } => draw::run_draw(
            &ctx,
            &script,
            import.as_deref(),
            output.as_deref(),
            &format,
            save_group,
            name.as_deref(),
        ),
        Commands::Play { ids, seconds, output, .. } => play::run_play(&ctx, &ids, seconds, output.as_deref()),
    }
}
