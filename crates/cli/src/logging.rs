//! Log sink for the binary.
//!
//! The libraries log through the `log` facade; the binary installs a
//! `tracing-subscriber` fmt layer that also captures those records.
//! `RUST_LOG` overrides the default level. The TUI owns the terminal, so
//! in that mode logs go to a file or nowhere.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Log to stderr (plain commands).
pub fn init_stderr(default_level: &str) -> Result<(), String> {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter(default_level))
        .with(layer)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {}", e))
}

/// Log to an append-only file (TUI mode).
pub fn init_file(path: &Path, default_level: &str) -> Result<(), String> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("failed to open log file {}: {}", path.display(), e))?;

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter(default_level))
        .with(layer)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {}", e))
}
