use super::{PAGE_SIZE, SOURCE_LIMIT, configure_source, select};
use crate::http;
use chrono::{DateTime, Utc};
use dayboard_core::plugin::{
    FetchContext, FetchResult, NewsItem, Plugin, PluginError, PluginInfo, PluginMetadata,
    TagState, Taggable,
};
use dayboard_core::tags::is_all;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

pub const HACKERNEWS_IDENTITY: &str = "hackernews";

const DEFAULT_BASE_URL: &str = "https://hn.algolia.com/api/v1";
const SUPPORTED_TAGS: &[&str] = &[
    "golang",
    "javascript",
    "python",
    "rust",
    "ai",
    "security",
    "startup",
    "programming",
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    points: Option<u32>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    created_at_i: Option<i64>,
}

/// Recent stories from the Hacker News Algolia search API
pub struct HackerNewsPlugin {
    info: PluginInfo,
    tags: TagState,
    client: Client,
    base_url: String,
    limit: usize,
}

impl HackerNewsPlugin {
    pub fn new() -> Self {
        Self {
            info: PluginInfo::new(HACKERNEWS_IDENTITY, "news")
                .name("Hacker News")
                .description("Latest stories from Hacker News"),
            tags: TagState::new(SUPPORTED_TAGS.iter().map(|t| t.to_string()).collect()),
            client: http::client(),
            base_url: DEFAULT_BASE_URL.to_string(),
            limit: SOURCE_LIMIT,
        }
    }

    /// Search term sent upstream; "story" when unfiltered
    fn query(tag: &str) -> &str {
        if is_all(tag) { "story" } else { tag }
    }
}

impl Default for HackerNewsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

/// Hits without a title or link are dropped
fn to_items(response: SearchResponse) -> Vec<NewsItem> {
    response
        .hits
        .into_iter()
        .filter_map(|hit| {
            let title = hit.title.filter(|t| !t.is_empty())?;
            let url = hit.url.filter(|u| !u.is_empty())?;
            Some(NewsItem {
                title,
                url,
                author: hit.author.unwrap_or_default(),
                source: HACKERNEWS_IDENTITY.to_string(),
                points: hit.points.unwrap_or(0),
                created_at: hit
                    .created_at_i
                    .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
                ..NewsItem::default()
            })
        })
        .collect()
}

impl Plugin for HackerNewsPlugin {
    fn identity(&self) -> &str {
        self.info.identity()
    }

    fn category(&self) -> &str {
        self.info.category()
    }

    fn configure(&mut self, options: &toml::Table) -> Result<(), PluginError> {
        configure_source(options, &self.tags, &mut self.base_url, &mut self.limit)
    }

    async fn fetch(&self, ctx: FetchContext) -> Result<FetchResult, PluginError> {
        let tag = self.tags.current_tag();
        let request = self
            .client
            .get(format!("{}/search_by_date", self.base_url))
            .query(&[
                ("tags", "story"),
                ("query", Self::query(&tag)),
                ("hitsPerPage", PAGE_SIZE),
            ]);

        let response: SearchResponse = http::get_json(&ctx, request, "Hacker News").await?;
        let items = select(to_items(response), &tag, self.limit);
        debug!(tag = %tag, count = items.len(), "Hacker News stories fetched");
        Ok(FetchResult::News(items))
    }

    fn metadata(&self) -> PluginMetadata {
        let mut config = BTreeMap::new();
        config.insert("current_tag".to_string(), self.tags.current_tag());
        config.insert(
            "supported_tags".to_string(),
            self.tags.supported_tags().join(","),
        );
        config.insert("limit".to_string(), self.limit.to_string());
        self.info.metadata(config)
    }

    fn as_taggable(&self) -> Option<&dyn Taggable> {
        Some(&self.tags)
    }
}
