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

pub const DEVTO_IDENTITY: &str = "devto";

const DEFAULT_BASE_URL: &str = "https://dev.to/api";
/// Look-back window in days for top articles
const TOP_DAYS: &str = "7";
const SUPPORTED_TAGS: &[&str] = &[
    "golang",
    "javascript",
    "python",
    "react",
    "webdev",
    "tutorial",
    "beginners",
    "productivity",
];

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    tag_list: Vec<String>,
    #[serde(default)]
    user: Option<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: String,
}

/// Top articles from the Dev.to public API
pub struct DevToPlugin {
    info: PluginInfo,
    tags: TagState,
    client: Client,
    base_url: String,
    limit: usize,
}

impl DevToPlugin {
    pub fn new() -> Self {
        Self {
            info: PluginInfo::new(DEVTO_IDENTITY, "news")
                .name("Dev.to")
                .description("Top articles from Dev.to"),
            tags: TagState::new(SUPPORTED_TAGS.iter().map(|t| t.to_string()).collect()),
            client: http::client(),
            base_url: DEFAULT_BASE_URL.to_string(),
            limit: SOURCE_LIMIT,
        }
    }
}

impl Default for DevToPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn to_items(articles: Vec<Article>) -> Vec<NewsItem> {
    articles
        .into_iter()
        .filter(|a| !a.title.is_empty() && !a.url.is_empty())
        .map(|a| NewsItem {
            title: a.title,
            url: a.url,
            author: a.user.map(|u| u.name).unwrap_or_default(),
            description: a.description.unwrap_or_default(),
            tags: a.tag_list,
            source: DEVTO_IDENTITY.to_string(),
            created_at: a.published_at,
            ..NewsItem::default()
        })
        .collect()
}

impl Plugin for DevToPlugin {
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
        let mut request = self
            .client
            .get(format!("{}/articles", self.base_url))
            .query(&[("per_page", PAGE_SIZE), ("top", TOP_DAYS)]);
        if !is_all(&tag) {
            request = request.query(&[("tag", tag.as_str())]);
        }

        let articles: Vec<Article> = http::get_json(&ctx, request, "Dev.to").await?;
        let items = select(to_items(articles), &tag, self.limit);
        debug!(tag = %tag, count = items.len(), "Dev.to articles fetched");
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
