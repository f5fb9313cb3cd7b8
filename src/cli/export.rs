//! Export command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{parse_id, studio_failure, Context};
use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::export::{export_gif, export_strip, ExportError};
use crate::group::{AnimationGroup, GroupId};
use crate::output::output_path;
use crate::runtime::{MAX_FPS, MIN_FPS};
use crate::store::FsStore;
use crate::studio::Studio;

fn load_group(ctx: &Context, id: &str) -> Result<AnimationGroup, ExitCode> {
    let id: GroupId = parse_id(id)?;
    let studio: Studio<FsStore> = ctx.open_studio().map_err(|e| studio_failure(&e))?;
    studio.group(&id).cloned().ok_or_else(|| {
        eprintln!("Error: no group with id '{}'", id);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

fn export_failure(e: &ExportError) -> ExitCode {
    eprintln!("Error: {}", e);
    ExitCode::from(EXIT_ERROR)
}

/// Write every frame of a group side by side as one PNG.
pub fn run_strip(ctx: &Context, id: &str, output: Option<&Path>) -> ExitCode {
    let group = match load_group(ctx, id) {
        Ok(group) => group,
        Err(code) => return code,
    };

    let path = output_path(&group.name, "strip", "png", output);
    match export_strip(&group, &path) {
        Ok((w, h)) => {
            eprintln!("Wrote: {} ({}x{})", path.display(), w, h);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => export_failure(&e),
    }
}

/// Write a group as a looping GIF.
pub fn run_gif(ctx: &Context, id: &str, output: Option<&Path>, fps: Option<u32>, scale: Option<f64>) -> ExitCode {
    let mut options = ctx.config.export.gif_options(&ctx.config.playback);
    if let Some(fps) = fps {
        if !(MIN_FPS..=MAX_FPS).contains(&fps) {
            eprintln!("Error: --fps must be between {} and {}", MIN_FPS, MAX_FPS);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        options.fps = fps;
    }
    if let Some(scale) = scale {
        if !(scale.is_finite() && scale > 0.0) {
            eprintln!("Error: --scale must be a positive number");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        options.scale = scale;
    }

    let group = match load_group(ctx, id) {
        Ok(group) => group,
        Err(code) => return code,
    };

    let path = output_path(&group.name, "anim", "gif", output);
    match export_gif(&group, &options, &path) {
        Ok((w, h)) => {
            eprintln!("Wrote: {} ({}x{}, {} fps)", path.display(), w, h, options.fps);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => export_failure(&e),
    }
}
