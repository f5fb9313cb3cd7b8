//! Pixel Studio - command-line host for the pixel editor and animation player

use std::process::ExitCode;

use pixelstudio::cli;

fn main() -> ExitCode {
    cli::run()
}
