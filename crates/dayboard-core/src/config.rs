//! Dashboard configuration loaded from `{home}/.config/dayboard/config.toml`.
//!
//! The file is optional. If it is absent or cannot be parsed, every field
//! falls back to [`DashboardConfig::default()`] and a warning is logged.
//!
//! # Example configuration
//!
//! ```toml
//! [user]
//! name = "Ada"
//! location = "Bengaluru,IN"
//!
//! [widgets.news]
//! ttl = "600s"
//! tags = ["golang", "security", "ai"]
//!
//! [plugins.openweathermap]
//! api_key = "..."
//! ```

use crate::home::config_dir;
use crate::scheduler::MAX_INTERVAL;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Refresh interval used when a widget has no usable `ttl`
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

pub const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub user: UserConfig,

    /// Keyed by widget (`weather`, `news`, `traffic`, ...)
    #[serde(default)]
    pub widgets: BTreeMap<String, WidgetConfig>,

    /// `[plugins.<identity>]` tables handed verbatim to `configure`
    #[serde(default)]
    pub plugins: BTreeMap<String, toml::Table>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_name")]
    pub name: String,

    /// Weather location, "City,CC"
    #[serde(default = "default_location")]
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WidgetConfig {
    /// Refresh interval such as "600s", "5m", "1h"
    #[serde(default)]
    pub ttl: Option<String>,

    /// Filter tags for taggable widgets
    #[serde(default)]
    pub tags: Vec<String>,

    /// Overrides the widget's built-in title
    #[serde(default)]
    pub title: Option<String>,
}

// ── Serde field defaults ──────────────────────────────────────────────────────

fn default_user_name() -> String {
    "there".to_string()
}

fn default_location() -> String {
    "Bengaluru,IN".to_string()
}

pub fn default_news_tags() -> Vec<String> {
    ["golang", "security", "ai"].map(String::from).to_vec()
}

// ── Default impl ──────────────────────────────────────────────────────────────

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: default_user_name(),
            location: default_location(),
        }
    }
}

// ── Accessors ─────────────────────────────────────────────────────────────────

impl DashboardConfig {
    /// Refresh interval for `widget`, falling back to `default`
    pub fn widget_ttl(&self, widget: &str, default: Duration) -> Duration {
        self.widgets
            .get(widget)
            .and_then(|w| w.ttl.as_deref())
            .map(|ttl| parse_ttl_or(ttl, default))
            .unwrap_or(default)
    }

    pub fn widget_title(&self, widget: &str) -> Option<&str> {
        self.widgets.get(widget).and_then(|w| w.title.as_deref())
    }

    /// Configured news tags, or the built-in set
    pub fn news_tags(&self) -> Vec<String> {
        match self.widgets.get("news") {
            Some(w) if !w.tags.is_empty() => w.tags.clone(),
            _ => default_news_tags(),
        }
    }

    /// Options for plugin `identity`, empty when the section is missing
    pub fn plugin_options(&self, identity: &str) -> toml::Table {
        self.plugins.get(identity).cloned().unwrap_or_default()
    }
}

// ── TTL parsing ───────────────────────────────────────────────────────────────

/// Parse "250ms", "600s", "5m" or "1h". A bare number is seconds.
/// Empty or invalid input yields [`DEFAULT_TTL`]; values above
/// [`MAX_INTERVAL`] are clamped to it.
pub fn parse_ttl(value: &str) -> Duration {
    parse_ttl_or(value, DEFAULT_TTL)
}

fn parse_ttl_or(value: &str, default: Duration) -> Duration {
    try_parse_ttl(value).unwrap_or(default)
}

fn try_parse_ttl(value: &str) -> Option<Duration> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let n: u64 = digits.parse().ok()?;
    let ttl = match unit.trim() {
        "ms" => Duration::from_millis(n),
        "" | "s" => Duration::from_secs(n),
        "m" => Duration::from_secs(n.checked_mul(60)?),
        "h" => Duration::from_secs(n.checked_mul(3600)?),
        _ => return None,
    };
    Some(ttl.min(MAX_INTERVAL))
}

// ── Config loader ─────────────────────────────────────────────────────────────

/// `{home}/.config/dayboard/config.toml`
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Load configuration from the default location
pub fn load_config() -> DashboardConfig {
    match config_path() {
        Ok(path) => load_config_from(&path),
        Err(e) => {
            warn!("Could not resolve config path: {e}. Using defaults.");
            DashboardConfig::default()
        }
    }
}

/// Load configuration from `path`, falling back to defaults on any failure
pub fn load_config_from(path: &Path) -> DashboardConfig {
    if !path.exists() {
        return DashboardConfig::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!("Could not read {}: {e}. Using defaults.", path.display());
            return DashboardConfig::default();
        }
    };

    match toml::from_str::<DashboardConfig>(&content) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Could not parse {}: {e}. Using defaults.", path.display());
            DashboardConfig::default()
        }
    }
}

pub const DEFAULT_CONFIG: &str = r#"# dayboard configuration

[user]
name = "Your Name"
location = "Bengaluru,IN"

[widgets.weather]
ttl = "600s"

[widgets.news]
ttl = "600s"
tags = ["golang", "security", "ai"]

[widgets.commits]
ttl = "5m"

[widgets.prs]
ttl = "5m"

[widgets.traffic]
ttl = "300s"

[plugins.openweathermap]
# api_key = "YOUR_OWM_API_KEY"

[plugins.local-git-commits]
# repositories = ["~/src/project"]
# author = "Your Name"

[plugins.github-prs]
# github_user = "octocat"
# token = "ghp_..."

[plugins.osrm_traffic]
# origin = "12.8452,77.6602"
# destination = "12.9698,77.7500"
"#;

/// Write [`DEFAULT_CONFIG`] to `path` unless a file already exists there.
/// Returns `true` when a file was written.
pub fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::home::HOME_ENV;
    use serial_test::serial;

    #[test]
    fn test_parse_ttl_units() {
        assert_eq!(parse_ttl("600s"), Duration::from_secs(600));
        assert_eq!(parse_ttl("5m"), Duration::from_secs(300));
        assert_eq!(parse_ttl("1h"), Duration::from_secs(3600));
        assert_eq!(parse_ttl("250ms"), Duration::from_millis(250));
        assert_eq!(parse_ttl("45"), Duration::from_secs(45));
    }

    #[test]
    fn test_parse_ttl_clamps_huge_values() {
        assert_eq!(parse_ttl("18446744073709551615s"), MAX_INTERVAL);
        assert_eq!(parse_ttl("18446744073709551615ms"), MAX_INTERVAL);
        assert_eq!(parse_ttl("99999999999999999999s"), DEFAULT_TTL);
    }

    #[test]
    fn test_parse_ttl_invalid_falls_back() {
        assert_eq!(parse_ttl(""), DEFAULT_TTL);
        assert_eq!(parse_ttl("soon"), DEFAULT_TTL);
        assert_eq!(parse_ttl("10d"), DEFAULT_TTL);
        assert_eq!(parse_ttl("-5s"), DEFAULT_TTL);
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        let cfg: DashboardConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.user.location, "Bengaluru,IN");
        assert_eq!(cfg.news_tags(), default_news_tags());
        assert!(cfg.plugin_options("openweathermap").is_empty());
    }

    #[test]
    fn test_default_config_parses() {
        let cfg: DashboardConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(cfg.user.name, "Your Name");
        assert_eq!(
            cfg.widget_ttl("traffic", DEFAULT_TTL),
            Duration::from_secs(300)
        );
        assert_eq!(
            cfg.widget_ttl("commits", DEFAULT_TTL),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn test_parse_widgets_and_plugins() {
        let toml = r#"
            [user]
            name = "Ada"

            [widgets.news]
            ttl = "5s"
            tags = ["rust"]
            title = "Reading"

            [plugins.osrm_traffic]
            origin = "12.8452,77.6602"
        "#;
        let cfg: DashboardConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.user.name, "Ada");
        assert_eq!(cfg.widget_ttl("news", DEFAULT_TTL), Duration::from_secs(5));
        assert_eq!(cfg.widget_ttl("weather", DEFAULT_TTL), DEFAULT_TTL);
        assert_eq!(cfg.widget_title("news"), Some("Reading"));
        assert_eq!(cfg.news_tags(), vec!["rust"]);
        let opts = cfg.plugin_options("osrm_traffic");
        assert_eq!(opts["origin"].as_str(), Some("12.8452,77.6602"));
    }

    #[test]
    #[serial]
    fn test_load_config_missing_file_returns_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var(HOME_ENV, dir.path()) };

        let cfg = load_config();
        assert_eq!(cfg.user.name, "there");

        unsafe { std::env::remove_var(HOME_ENV) };
    }

    #[test]
    #[serial]
    fn test_load_config_malformed_returns_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var(HOME_ENV, dir.path()) };
        let path = config_path().unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[user\nname = ").unwrap();

        let cfg = load_config();
        assert_eq!(cfg.user.location, "Bengaluru,IN");

        unsafe { std::env::remove_var(HOME_ENV) };
    }

    #[test]
    #[serial]
    fn test_write_default_config_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".config/dayboard/config.toml");
        assert!(write_default_config(&path).unwrap());
        assert!(!write_default_config(&path).unwrap());

        let cfg = load_config_from(&path);
        assert_eq!(cfg.news_tags(), default_news_tags());
    }
}
