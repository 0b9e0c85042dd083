//! Tag filtering and cycling for news-style widgets.

use crate::plugin::{ALL_TAG, NewsItem};

/// Label shown for the unfiltered position
pub const ALL_LABEL: &str = "All";

/// `true` when `tag` is the "no filter" sentinel
pub fn is_all(tag: &str) -> bool {
    let tag = tag.trim();
    tag.is_empty() || tag.eq_ignore_ascii_case(ALL_TAG)
}

/// Case-insensitive substring match on title, description or any item tag
pub fn matches_tag(item: &NewsItem, tag: &str) -> bool {
    if is_all(tag) {
        return true;
    }
    let needle = tag.trim().to_lowercase();
    item.title.to_lowercase().contains(&needle)
        || item.description.to_lowercase().contains(&needle)
        || item.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

/// Keep the items matching `tag`, preserving order
pub fn filter_by_tag(items: Vec<NewsItem>, tag: &str) -> Vec<NewsItem> {
    if is_all(tag) {
        return items;
    }
    items.into_iter().filter(|i| matches_tag(i, tag)).collect()
}

/// Cycles "All" → tag 1 → … → tag N → "All"
#[derive(Debug, Clone, Default)]
pub struct TagCycle {
    tags: Vec<String>,
    index: usize,
}

impl TagCycle {
    pub fn new(tags: Vec<String>) -> Self {
        Self { tags, index: 0 }
    }

    /// Step to the next position and return its label
    pub fn advance(&mut self) -> &str {
        self.index = (self.index + 1) % (self.tags.len() + 1);
        self.current()
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Display label: "All" or the configured tag
    pub fn current(&self) -> &str {
        match self.index {
            0 => ALL_LABEL,
            i => &self.tags[i - 1],
        }
    }

    /// Value to hand to plugins: "all" or the lowercased tag
    pub fn current_filter(&self) -> String {
        match self.index {
            0 => ALL_TAG.to_string(),
            i => self.tags[i - 1].to_lowercase(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> NewsItem {
        NewsItem {
            title: title.into(),
            ..NewsItem::default()
        }
    }

    #[test]
    fn test_filter_by_tag() {
        let items = vec![titled("golang news"), titled("python")];
        let filtered = filter_by_tag(items.clone(), "golang");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "golang news");

        assert_eq!(filter_by_tag(items.clone(), "all").len(), 2);
        assert_eq!(filter_by_tag(items, "").len(), 2);
    }

    #[test]
    fn test_match_is_case_insensitive_across_fields() {
        let mut item = titled("Release notes");
        item.description = "New GoLang toolchain".into();
        assert!(matches_tag(&item, "golang"));

        let mut tagged = titled("Weekly");
        tagged.tags = vec!["WebSecurity".into()];
        assert!(matches_tag(&tagged, "security"));
        assert!(!matches_tag(&tagged, "ai"));
    }

    #[test]
    fn test_cycle_wraps() {
        let mut cycle = TagCycle::new(vec!["a".into(), "b".into()]);
        assert_eq!(cycle.current(), "All");
        let visited: Vec<String> = (0..6).map(|_| cycle.advance().to_string()).collect();
        assert_eq!(visited, vec!["a", "b", "All", "a", "b", "All"]);
    }

    #[test]
    fn test_cycle_reset_and_filter() {
        let mut cycle = TagCycle::new(vec!["Security".into()]);
        cycle.advance();
        assert_eq!(cycle.current_filter(), "security");
        cycle.reset();
        assert_eq!(cycle.current_filter(), "all");
    }

    #[test]
    fn test_cycle_without_tags_stays_on_all() {
        let mut cycle = TagCycle::default();
        assert_eq!(cycle.advance(), "All");
        assert_eq!(cycle.index(), 0);
    }
}
