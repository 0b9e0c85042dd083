//! Static content for widgets that have no live source yet.

use dayboard_core::plugin::{
    FetchClass, FetchContext, FetchResult, Plugin, PluginError, PluginInfo, PluginMetadata,
};
use dayboard_core::widget::DisplayItem;
use std::collections::BTreeMap;

/// Identity prefix; the widget key follows the colon
pub const PLACEHOLDER_PREFIX: &str = "placeholder";

pub fn placeholder_identity(widget: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}:{widget}")
}

/// Built-in sample rows for a known widget key
pub fn sample_items(widget: &str) -> Vec<DisplayItem> {
    match widget {
        "jira" => vec![
            DisplayItem::new("ENG-421 UI bug", "⏳ 8h")
                .status("[w]")
                .link("https://jira.example.com/browse/ENG-421"),
            DisplayItem::new("ENG-389 SSO fix", "—")
                .status("[w]")
                .link("https://jira.example.com/browse/ENG-389"),
            DisplayItem::new("ENG-456 Performance", "⏳ 4h")
                .link("https://jira.example.com/browse/ENG-456"),
        ],
        "builds" => vec![
            DisplayItem::new("main branch", "Failed")
                .status("❌")
                .link("https://ci.example.com/build/456"),
        ],
        "calendar" => vec![
            DisplayItem::new("Team Standup", "9:00 AM"),
            DisplayItem::new("Code Review", "2:00 PM"),
            DisplayItem::new("Sprint Planning", "4:00 PM"),
        ],
        "slack" => vec![
            DisplayItem::new("general", "New message").status("🔴"),
            DisplayItem::new("dev-team", "3 unread").status("🔴"),
        ],
        "todos" => vec![
            DisplayItem::new("Review PR #123", "High priority").status("🔴"),
            DisplayItem::new("Update docs", "Medium priority").status("🟡"),
            DisplayItem::new("Fix test", "Low priority").status("🟢"),
        ],
        "confluence" => vec![
            DisplayItem::new("API Documentation", "Updated 2h ago"),
            DisplayItem::new("Architecture Guide", "Updated 1d ago"),
        ],
        _ => Vec::new(),
    }
}

/// Serves a fixed item list for one widget
pub struct PlaceholderPlugin {
    info: PluginInfo,
    widget: String,
    items: Vec<DisplayItem>,
}

impl PlaceholderPlugin {
    pub fn new(widget: &str) -> Self {
        Self {
            info: PluginInfo::new(placeholder_identity(widget), PLACEHOLDER_PREFIX)
                .name(format!("{widget} placeholder"))
                .description("Static sample items"),
            widget: widget.to_string(),
            items: sample_items(widget),
        }
    }

    pub fn with_items(widget: &str, items: Vec<DisplayItem>) -> Self {
        Self {
            items,
            ..Self::new(widget)
        }
    }
}

impl Plugin for PlaceholderPlugin {
    fn identity(&self) -> &str {
        self.info.identity()
    }

    fn category(&self) -> &str {
        self.info.category()
    }

    /// `items = [{ title = "..", subtitle = "..", status = "..", link = ".." }]`
    /// replaces the built-in rows.
    fn configure(&mut self, options: &toml::Table) -> Result<(), PluginError> {
        let Some(value) = options.get("items") else {
            return Ok(());
        };
        let rows = value
            .as_array()
            .ok_or_else(|| PluginError::config("items must be an array of tables"))?;
        self.items = rows
            .iter()
            .map(|row| {
                let row = row
                    .as_table()
                    .ok_or_else(|| PluginError::config("items must be an array of tables"))?;
                let field = |key: &str| {
                    row.get(key)
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string()
                };
                if field("title").is_empty() {
                    return Err(PluginError::config("every item needs a title"));
                }
                Ok(DisplayItem::new(field("title"), field("subtitle"))
                    .status(field("status"))
                    .link(field("link")))
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    async fn fetch(&self, _ctx: FetchContext) -> Result<FetchResult, PluginError> {
        Ok(FetchResult::Items(self.items.clone()))
    }

    fn metadata(&self) -> PluginMetadata {
        let mut config = BTreeMap::new();
        config.insert("widget".to_string(), self.widget.clone());
        config.insert("items".to_string(), self.items.len().to_string());
        self.info.metadata(config)
    }

    fn fetch_class(&self) -> FetchClass {
        FetchClass::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fetch_returns_sample_items() {
        let plugin = PlaceholderPlugin::new("todos");
        assert_eq!(plugin.identity(), "placeholder:todos");
        assert_eq!(plugin.category(), "placeholder");

        let ctx = FetchContext::with_timeout(Duration::from_secs(1));
        let FetchResult::Items(items) = plugin.fetch(ctx).await.unwrap() else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].status, "🔴");
    }

    #[test]
    fn test_unknown_widget_has_no_rows() {
        assert!(sample_items("pagerduty").is_empty());
        assert_eq!(PlaceholderPlugin::new("pagerduty").metadata().config["items"], "0");
    }

    #[test]
    fn test_configure_replaces_rows() {
        let mut plugin = PlaceholderPlugin::new("slack");
        let options: toml::Table = toml::from_str(
            "items = [{ title = 'oncall', subtitle = '2 unread', status = '🔴', link = 'https://chat/x' }]",
        )
        .unwrap();
        plugin.configure(&options).unwrap();
        assert_eq!(plugin.items.len(), 1);
        assert_eq!(plugin.items[0].link.as_deref(), Some("https://chat/x"));

        let bad: toml::Table = toml::from_str("items = [{ subtitle = 'x' }]").unwrap();
        assert!(plugin.configure(&bad).is_err());
    }
}
