//! Import command implementation

use std::path::PathBuf;
use std::process::ExitCode;

use super::{report_warnings, studio_failure, Context};
use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::import::{decode_all, decode_file, expand_inputs, group_sequences, ImportError};

/// Execute the import command.
///
/// A single image file is sliced with the configured grid. Several files, or
/// a directory, are grouped into numbered sequences, one group per sequence.
pub fn run_import(ctx: &Context, paths: &[PathBuf], name: Option<&str>) -> ExitCode {
    let files = match expand_inputs(paths) {
        Ok(files) => files,
        Err(e) => return import_failure(&e),
    };

    let mut studio = match ctx.open_studio() {
        Ok(studio) => studio,
        Err(e) => return studio_failure(&e),
    };

    let single_sheet = paths.len() == 1 && files.len() == 1 && !paths[0].is_dir();
    let created = if single_sheet {
        let sheet = match decode_file(&files[0]) {
            Ok(imported) => imported.image,
            Err(e) => return import_failure(&e),
        };
        let grid = ctx.config.slice.grid();
        studio.create_from_slice(&sheet, grid, name).map(|id| vec![id])
    } else {
        let images = match decode_all(&files) {
            Ok(images) => images,
            Err(e) => return import_failure(&e),
        };
        let ids = studio.create_from_sequences(group_sequences(images));
        match (ids, name) {
            (Ok(ids), Some(name)) if ids.len() == 1 => studio.rename(&ids[0], name).map(|()| ids),
            (Ok(ids), Some(_)) => {
                eprintln!("Warning: --name ignored, {} groups were created", ids.len());
                Ok(ids)
            }
            (result, _) => result,
        }
    };

    let ids = match created {
        Ok(ids) => ids,
        Err(e) => return studio_failure(&e),
    };
    report_warnings(&mut studio);

    for id in &ids {
        if let Some(group) = studio.group(id) {
            println!("{}  {}  {} frames", group.id, group.name, group.frame_count());
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}

fn import_failure(e: &ImportError) -> ExitCode {
    eprintln!("Error: {}", e);
    match e {
        ImportError::NoImages | ImportError::InvalidPattern(..) => ExitCode::from(EXIT_INVALID_ARGS),
        _ => ExitCode::from(EXIT_ERROR),
    }
}
