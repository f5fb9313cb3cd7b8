//! Library commands: list, rename, delete and reslice stored groups

use std::path::Path;
use std::process::ExitCode;

use super::{parse_id, report_warnings, studio_failure, Context};
use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::group::SliceConfig;
use crate::import::decode_file;

/// Print one line per group, oldest first.
pub fn run_list(ctx: &Context) -> ExitCode {
    let studio = match ctx.open_studio() {
        Ok(studio) => studio,
        Err(e) => return studio_failure(&e),
    };

    if studio.groups().is_empty() {
        eprintln!("No groups in {}", ctx.config.store.dir.display());
        return ExitCode::from(EXIT_SUCCESS);
    }

    for group in studio.groups() {
        let grid = group.slice_config().map(|g| g.to_string()).unwrap_or_else(|| "-".to_string());
        let (w, h) = group.frames().frame_size().unwrap_or((0, 0));
        println!("{}  {}  {} frames  {}x{}  grid {}", group.id, group.name, group.frame_count(), w, h, grid);
    }
    ExitCode::from(EXIT_SUCCESS)
}

pub fn run_rename(ctx: &Context, id: &str, name: &str) -> ExitCode {
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(code) => return code,
    };
    let mut studio = match ctx.open_studio() {
        Ok(studio) => studio,
        Err(e) => return studio_failure(&e),
    };

    if let Err(e) = studio.rename(&id, name) {
        return studio_failure(&e);
    }
    report_warnings(&mut studio);
    ExitCode::from(EXIT_SUCCESS)
}

pub fn run_delete(ctx: &Context, id: &str) -> ExitCode {
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(code) => return code,
    };
    let mut studio = match ctx.open_studio() {
        Ok(studio) => studio,
        Err(e) => return studio_failure(&e),
    };

    match studio.delete(&id) {
        Ok(group) => {
            report_warnings(&mut studio);
            eprintln!("Deleted: {} ({})", group.id, group.name);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => studio_failure(&e),
    }
}

/// Re-cut a group from a sheet; the group keeps its frames if slicing fails.
pub fn run_reslice(ctx: &Context, id: &str, image: &Path, rows: u32, cols: u32) -> ExitCode {
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(code) => return code,
    };
    let sheet = match decode_file(image) {
        Ok(imported) => imported.image,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let mut studio = match ctx.open_studio() {
        Ok(studio) => studio,
        Err(e) => return studio_failure(&e),
    };

    if let Err(e) = studio.reslice(&id, &sheet, SliceConfig::new(rows, cols)) {
        return studio_failure(&e);
    }
    report_warnings(&mut studio);
    if let Some(group) = studio.group(&id) {
        println!("{}  {}  {} frames", group.id, group.name, group.frame_count());
    }
    ExitCode::from(EXIT_SUCCESS)
}
