//! Process-level logging setup.
//!
//! The dashboard owns the terminal, so the binary logs to a file instead of
//! stderr. The level comes from `DAYBOARD_LOG`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

pub const LOG_ENV: &str = "DAYBOARD_LOG";

static INIT: OnceLock<()> = OnceLock::new();

fn parse_level(value: Option<&str>) -> tracing::Level {
    match value.unwrap_or("info").to_ascii_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

/// Initialize tracing, appending to `log_file` when given and to stderr
/// otherwise.
///
/// Safe to call multiple times; only the first call installs a subscriber.
/// Best-effort: if the file cannot be opened, logging falls back to stderr.
pub fn init(log_file: Option<&Path>) {
    if INIT.get().is_some() {
        return;
    }
    let level = parse_level(std::env::var(LOG_ENV).ok().as_deref());

    let file = log_file.and_then(|path| {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    let _ = match file {
        Some(file) => tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    let _ = INIT.set(());
}
