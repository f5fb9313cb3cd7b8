//! Play command implementation
//!
//! Simulates the playback loop at 60 ticks per second for a fixed time and
//! writes the composed view as one PNG.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use super::{parse_id, studio_failure, Context};
use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::output::{output_path, save_png};

const TICK_RATE: f64 = 60.0;

/// Execute the play command.
pub fn run_play(ctx: &Context, ids: &[String], seconds: f64, output: Option<&Path>) -> ExitCode {
    if !(seconds.is_finite() && seconds >= 0.0) {
        eprintln!("Error: --seconds must be zero or positive");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    let ids = match ids.iter().map(|s| parse_id(s)).collect::<Result<Vec<_>, _>>() {
        Ok(ids) => ids,
        Err(code) => return code,
    };

    let mut studio = match ctx.open_studio() {
        Ok(studio) => studio,
        Err(e) => return studio_failure(&e),
    };
    // Loading activates the first stored group; only the requested ids play.
    for id in studio.runtime().active().to_vec() {
        studio.runtime_mut().deactivate(&id);
    }
    for id in &ids {
        if let Err(e) = studio.activate(id) {
            return studio_failure(&e);
        }
    }

    let ticks = (seconds * TICK_RATE).round() as u64;
    let step = Duration::from_secs_f64(1.0 / TICK_RATE);
    for _ in 0..ticks {
        studio.runtime_mut().tick(step);
    }

    let view = studio.render();
    let path = output_path("play", "view", "png", output);
    if let Err(e) = save_png(&view, &path) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    for id in studio.runtime().active() {
        if let Some(sprite) = studio.runtime().sprite(id) {
            println!("{}  frame {}  {} fps  scale {}", id, sprite.frame(), sprite.frame_rate, sprite.scale);
        }
    }
    eprintln!("Wrote: {} ({}x{})", path.display(), view.width(), view.height());
    ExitCode::from(EXIT_SUCCESS)
}
