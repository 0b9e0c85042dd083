//! Taggable news sources.
//!
//! Both sources narrow their upstream query by the active tag and then
//! re-filter locally, since the APIs match loosely.

mod devto;
mod hackernews;

pub use devto::{DEVTO_IDENTITY, DevToPlugin};
pub use hackernews::{HACKERNEWS_IDENTITY, HackerNewsPlugin};

use crate::options;
use dayboard_core::plugin::{NewsItem, PluginError, TagState};
use dayboard_core::tags::filter_by_tag;

/// Items kept per source after filtering
pub const SOURCE_LIMIT: usize = 10;

/// Items requested from each API
const PAGE_SIZE: &str = "15";

/// Filter by `tag` and cap at `limit`
fn select(items: Vec<NewsItem>, tag: &str, limit: usize) -> Vec<NewsItem> {
    let mut items = filter_by_tag(items, tag);
    items.truncate(limit);
    items
}

/// Options common to both sources: `base_url`, `tags`, `current_tag`, `limit`
fn configure_source(
    options: &toml::Table,
    tags: &TagState,
    base_url: &mut String,
    limit: &mut usize,
) -> Result<(), PluginError> {
    if let Some(url) = options::base_url(options) {
        *base_url = url;
    }
    if let Some(configured) = options::string_list(options, "tags")? {
        tags.set_tags(configured);
    }
    if let Some(current) = options::string(options, "current_tag") {
        tags.set_current_tag(&current);
    }
    if let Some(n) = options::positive(options, "limit")? {
        *limit = n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            ..NewsItem::default()
        }
    }

    #[test]
    fn test_select_filters_then_truncates() {
        let items = (0..20)
            .map(|i| item(&format!("{} {i}", if i % 2 == 0 { "rust" } else { "go" })))
            .collect();
        let picked = select(items, "rust", 3);
        let titles: Vec<_> = picked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["rust 0", "rust 2", "rust 4"]);
    }

    #[test]
    fn test_configure_source_reads_common_options() {
        let tags = TagState::default();
        let mut base = "https://example.com".to_string();
        let mut limit = SOURCE_LIMIT;
        let options: toml::Table = toml::from_str(
            "base_url = 'http://localhost:1/'\ntags = ['ai']\ncurrent_tag = 'ai'\nlimit = 4",
        )
        .unwrap();

        configure_source(&options, &tags, &mut base, &mut limit).unwrap();
        assert_eq!(base, "http://localhost:1");
        assert_eq!(tags.tags(), vec!["ai"]);
        assert_eq!(tags.current_tag(), "ai");
        assert_eq!(limit, 4);
    }
}
