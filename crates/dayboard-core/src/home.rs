//! Home directory resolution for dayboard.
//!
//! # Precedence
//!
//! 1. `DAYBOARD_HOME` environment variable (if set and non-empty)
//! 2. `dirs::home_dir()` platform default
//!
//! Tests point `DAYBOARD_HOME` at a temporary directory so they never read
//! or write the real user configuration.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const HOME_ENV: &str = "DAYBOARD_HOME";

/// Get the home directory dayboard reads its configuration under
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV) {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().context("Could not determine home directory")
}

/// `{home}/.config/dayboard`
pub fn config_dir() -> Result<PathBuf> {
    Ok(get_home_dir()?.join(".config").join("dayboard"))
}
