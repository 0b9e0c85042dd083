//! Composite news plugin that fans out to taggable children.

use crate::plugin::{
    FetchContext, FetchResult, NewsItem, Plugin, PluginError, PluginInfo, PluginMetadata,
    SharedPlugin, TagState, Taggable,
};
use crate::tags::filter_by_tag;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

pub const AGGREGATE_IDENTITY: &str = "aggregate-news";
/// Upper bound on merged items
pub const MAX_ITEMS: usize = 12;
/// Children must finish this fraction of the remaining time before the
/// aggregate's own deadline
const CHILD_MARGIN_DIVISOR: u32 = 10;

/// Merges the news items of its children.
///
/// Children are fetched concurrently, each in its own task. A failed or
/// panicking child contributes nothing; the aggregate fails only when every
/// child fails and nothing was cached by an earlier cycle.
pub struct AggregatePlugin {
    info: PluginInfo,
    tags: TagState,
    children: Vec<SharedPlugin>,
    cache: Mutex<Option<Vec<NewsItem>>>,
    max_items: usize,
}

impl AggregatePlugin {
    pub fn new(children: Vec<SharedPlugin>) -> Self {
        let plugin = Self {
            info: PluginInfo::new(AGGREGATE_IDENTITY, "news")
                .name("Aggregate News")
                .description("Merged feed from every news source"),
            tags: TagState::default(),
            children,
            cache: Mutex::new(None),
            max_items: MAX_ITEMS,
        };
        plugin.refresh_supported_tags();
        plugin
    }

    pub fn children(&self) -> &[SharedPlugin] {
        &self.children
    }

    /// "all" followed by the union of the children's tags
    fn refresh_supported_tags(&self) {
        let union = self
            .children
            .iter()
            .filter_map(|c| c.as_taggable())
            .flat_map(|t| t.supported_tags())
            .collect();
        self.tags.set_supported_tags(union);
    }

    fn cached(&self) -> Option<Vec<NewsItem>> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn propagate_tag(&self, tag: &str) {
        for child in &self.children {
            if let Some(taggable) = child.as_taggable() {
                taggable.set_current_tag(tag);
            }
        }
    }
}

impl Plugin for AggregatePlugin {
    fn identity(&self) -> &str {
        self.info.identity()
    }

    fn category(&self) -> &str {
        self.info.category()
    }

    fn configure(&mut self, options: &toml::Table) -> Result<(), PluginError> {
        if let Some(max) = options.get("max_items").and_then(|v| v.as_integer()) {
            self.max_items = usize::try_from(max).unwrap_or(MAX_ITEMS).max(1);
        }
        if let Some(tags) = options.get("tags").and_then(|v| v.as_array()) {
            self.tags.set_tags(
                tags.iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect(),
            );
        }
        Ok(())
    }

    async fn fetch(&self, ctx: FetchContext) -> Result<FetchResult, PluginError> {
        let tag = self.tags.current_tag();
        self.propagate_tag(&tag);

        let child_ctx = ctx.child_before(ctx.remaining() / CHILD_MARGIN_DIVISOR);
        let child_deadline = child_ctx.deadline();
        let handles: Vec<_> = self
            .children
            .iter()
            .map(|child| {
                let child = child.clone();
                let ctx = child_ctx.clone();
                tokio::spawn(async move { child.fetch(ctx).await })
            })
            .collect();

        let mut merged = Vec::new();
        let mut succeeded = 0usize;
        for (child, mut handle) in self.children.iter().zip(handles) {
            let Ok(joined) = tokio::time::timeout_at(child_deadline, &mut handle).await else {
                handle.abort();
                warn!(child = child.identity(), "Child fetch overran its deadline");
                continue;
            };
            match joined {
                Ok(Ok(FetchResult::News(items))) => {
                    debug!(child = child.identity(), count = items.len(), "Child fetched");
                    succeeded += 1;
                    merged.extend(items);
                }
                Ok(Ok(FetchResult::NotConfigured { reason })) => {
                    debug!(child = child.identity(), "Child not configured: {reason}");
                }
                Ok(Ok(other)) => {
                    warn!(
                        child = child.identity(),
                        kind = other.kind(),
                        "Child returned a non-news result"
                    );
                }
                Ok(Err(e)) => warn!(child = child.identity(), "Child fetch failed: {e}"),
                Err(e) if e.is_panic() => warn!(child = child.identity(), "Child fetch panicked"),
                Err(e) => warn!(child = child.identity(), "Child task failed: {e}"),
            }
        }

        if succeeded == 0 && !self.children.is_empty() {
            return match self.cached() {
                Some(items) => {
                    debug!("Every child failed, serving cached aggregate");
                    Ok(FetchResult::News(items))
                }
                None => Err(PluginError::fetch("every news source failed")),
            };
        }

        let mut items = filter_by_tag(merged, &tag);
        items.truncate(self.max_items);
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(items.clone());
        Ok(FetchResult::News(items))
    }

    fn metadata(&self) -> PluginMetadata {
        let mut config = BTreeMap::new();
        config.insert("max_items".to_string(), self.max_items.to_string());
        config.insert(
            "children".to_string(),
            self.children
                .iter()
                .map(|c| c.identity().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        );
        self.info.metadata(config)
    }

    fn as_taggable(&self) -> Option<&dyn Taggable> {
        Some(self)
    }
}

impl Taggable for AggregatePlugin {
    fn set_tags(&self, tags: Vec<String>) {
        self.tags.set_tags(tags.clone());
        for child in &self.children {
            if let Some(taggable) = child.as_taggable() {
                taggable.set_tags(tags.clone());
            }
        }
    }

    fn current_tag(&self) -> String {
        self.tags.current_tag()
    }

    fn set_current_tag(&self, tag: &str) {
        self.tags.set_current_tag(tag);
    }

    fn supported_tags(&self) -> Vec<String> {
        self.refresh_supported_tags();
        self.tags.supported_tags()
    }
}
