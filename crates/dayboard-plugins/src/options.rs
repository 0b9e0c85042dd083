//! Typed reads from a plugin's `[plugins.<identity>]` table.

use dayboard_core::plugin::PluginError;
use toml::{Table, Value};

/// Trimmed, non-empty string value of `key`
pub fn string(options: &Table, key: &str) -> Option<String> {
    options
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// An array of strings, or a single comma-separated string.
///
/// Non-string array entries are a configuration error.
pub fn string_list(options: &Table, key: &str) -> Result<Option<Vec<String>>, PluginError> {
    match options.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| {
                v.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| PluginError::config(format!("{key} must contain only strings")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(other) => Err(PluginError::config(format!(
            "{key} must be a list of strings, got {}",
            other.type_str()
        ))),
    }
}

/// A positive integer
pub fn positive(options: &Table, key: &str) -> Result<Option<usize>, PluginError> {
    match options.get(key) {
        None => Ok(None),
        Some(Value::Integer(n)) if *n > 0 => Ok(Some(*n as usize)),
        Some(other) => Err(PluginError::config(format!(
            "{key} must be a positive integer, got {other}"
        ))),
    }
}

/// `base_url` override used by tests and self-hosted mirrors, without a
/// trailing slash
pub fn base_url(options: &Table) -> Option<String> {
    string(options, "base_url").map(|url| url.trim_end_matches('/').to_string())
}
