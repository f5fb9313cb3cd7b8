//! CLI dispatch for the `pxs draw` command.
//!
//! Runs an editor script headlessly, then writes the final canvas. Canvas
//! saves requested by the script (`ctrl+s`) become groups in the store.

use std::path::Path;
use std::process::ExitCode;

use image::RgbaImage;

use super::{report_warnings, studio_failure, Context};
use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::editor::{Editor, Effect};
use crate::export::{export_canvas, CanvasFormat};
use crate::import::decode_file;
use crate::output::output_path;
use crate::script::{self, parse_script};
use crate::studio::PIXEL_NAME;

/// Execute the draw command.
pub fn run_draw(
    ctx: &Context,
    script_path: &Path,
    import: Option<&Path>,
    output: Option<&Path>,
    format: &str,
    save_group: bool,
    name: Option<&str>,
) -> ExitCode {
    let format = match CanvasFormat::from_name(format) {
        Ok(format) => format,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let source = match std::fs::read_to_string(script_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", script_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let script = match parse_script(&source) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("Error: {}: {}", script_path.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut editor = match Editor::new(&ctx.config.canvas.editor_settings()) {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    if let Some(path) = import {
        let loaded = decode_file(path).map_err(|e| e.to_string()).and_then(|imported| {
            editor.canvas_mut().load_image(&imported.image).map_err(|e| e.to_string())
        });
        if let Err(message) = loaded {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let mut saves: Vec<RgbaImage> = Vec::new();
    let steps = script::run(&mut editor, &script, |editor, effect| match effect {
        Effect::Save => {
            saves.push(editor.canvas().buffer().clone());
            true
        }
        Effect::Close => false,
        Effect::OpenImport => {
            eprintln!("Warning: open-import has no file picker here; use --import");
            true
        }
    });
    let steps = match steps {
        Ok(steps) => steps,
        Err(e) => {
            eprintln!("Error: {}: {}", script_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    tracing::info!(steps, saves = saves.len(), "script finished");

    if save_group {
        saves.push(editor.canvas().buffer().clone());
    }
    if !saves.is_empty() {
        let mut studio = match ctx.open_studio() {
            Ok(studio) => studio,
            Err(e) => return studio_failure(&e),
        };
        for image in &saves {
            match studio.create_from_canvas(image, name) {
                Ok(id) => println!("{}", id),
                Err(e) => return studio_failure(&e),
            }
        }
        report_warnings(&mut studio);
    }

    let path = output_path(name.unwrap_or(PIXEL_NAME), "canvas", format.extension(), output);
    if let Err(e) = export_canvas(editor.canvas().buffer(), format, ctx.config.export.jpeg_quality, &path) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }
    let size = editor.canvas().grid_size();
    eprintln!("Wrote: {} ({}x{}, {})", path.display(), size, size, format);
    ExitCode::from(EXIT_SUCCESS)
}
