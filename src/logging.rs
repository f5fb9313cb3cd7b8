//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! The library only emits events; the `pxs` binary installs the subscriber.
//! Log lines go to stderr so they never mix with file output on stdout.
//!
//! | Flags    | Level |
//! |----------|-------|
//! | `-q`     | error |
//! | (none)   | warn  |
//! | `-v`     | info  |
//! | `-vv`    | debug |
//! | `-vvv`   | trace |
//!
//! `RUST_LOG` takes precedence over the flags when it is set.

use std::io;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for logging behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: Level::WARN, with_target: false, with_ansi: true }
    }
}

impl LogConfig {
    /// Build a config from `-v` count and the `-q` flag.
    #[must_use]
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        let level = if quiet {
            Level::ERROR
        } else {
            match verbose {
                0 => Level::WARN,
                1 => Level::INFO,
                2 => Level::DEBUG,
                _ => Level::TRACE,
            }
        };
        Self { level, with_target: verbose >= 2, ..Self::default() }
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("pixelstudio={}", level.as_str().to_ascii_lowercase())))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .without_time();

    // Fails only when a subscriber is already installed, e.g. in tests.
    let _ = tracing_subscriber::registry().with(build_env_filter(config.level)).with(layer).try_init();
}
