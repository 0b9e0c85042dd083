//! Open pull requests authored by a GitHub user.

use crate::{http, options};
use chrono::{DateTime, Utc};
use dayboard_core::plugin::{
    FetchContext, FetchResult, Plugin, PluginError, PluginInfo, PluginMetadata, PullRequest,
};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

pub const GITHUB_PRS_IDENTITY: &str = "github-prs";

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const PER_PAGE: &str = "10";
const TOKEN_ENV: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];
const USER_ENV: &str = "GITHUB_USER";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    number: u64,
    title: String,
    #[serde(default)]
    state: String,
    user: Option<User>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    draft: Option<bool>,
    #[serde(default)]
    repository_url: String,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

/// Last path segment of `https://api.github.com/repos/{owner}/{name}`
fn repository_name(repository_url: &str) -> String {
    repository_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

impl From<SearchItem> for PullRequest {
    fn from(item: SearchItem) -> Self {
        PullRequest {
            number: item.number,
            title: item.title,
            state: item.state,
            author: item.user.map(|u| u.login).unwrap_or_default(),
            repository: repository_name(&item.repository_url),
            url: item.html_url,
            draft: item.draft.unwrap_or(false),
            updated_at: item.updated_at,
        }
    }
}

pub struct GitHubPrsPlugin {
    info: PluginInfo,
    client: Client,
    base_url: String,
    user: Option<String>,
    token: Option<String>,
}

impl GitHubPrsPlugin {
    pub fn new() -> Self {
        Self {
            info: PluginInfo::new(GITHUB_PRS_IDENTITY, "git")
                .name("GitHub Pull Requests")
                .description("Open pull requests for the configured GitHub user"),
            client: http::client(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user: None,
            token: None,
        }
    }

    /// `env` resolves fallbacks for options the table leaves out
    fn configure_with(
        &mut self,
        options: &toml::Table,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(), PluginError> {
        if let Some(url) = options::base_url(options) {
            self.base_url = url;
        }
        self.token = options::string(options, "token")
            .or_else(|| TOKEN_ENV.iter().find_map(|key| env(*key)))
            .filter(|t| !t.trim().is_empty());
        self.user = options::string(options, "github_user")
            .or_else(|| env(USER_ENV))
            .filter(|u| !u.trim().is_empty());

        if self.user.is_none() {
            return Err(PluginError::config(format!(
                "github_user is required (or set {USER_ENV})"
            )));
        }
        Ok(())
    }
}

impl Default for GitHubPrsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for GitHubPrsPlugin {
    fn identity(&self) -> &str {
        self.info.identity()
    }

    fn category(&self) -> &str {
        self.info.category()
    }

    fn configure(&mut self, options: &toml::Table) -> Result<(), PluginError> {
        self.configure_with(options, |key| std::env::var(key).ok())
    }

    async fn fetch(&self, ctx: FetchContext) -> Result<FetchResult, PluginError> {
        let Some(user) = &self.user else {
            return Ok(FetchResult::NotConfigured {
                reason: "github_user is not configured".to_string(),
            });
        };

        let query = format!("type:pr author:{user} is:open");
        let mut request = self
            .client
            .get(format!("{}/search/issues", self.base_url))
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
            .query(&[
                ("q", query.as_str()),
                ("sort", "updated"),
                ("per_page", PER_PAGE),
            ]);
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("token {token}"));
        }

        let response: SearchResponse = http::get_json(&ctx, request, "GitHub").await?;
        let prs: Vec<PullRequest> = response.items.into_iter().map(PullRequest::from).collect();
        debug!(user = %user, count = prs.len(), "Pull requests fetched");
        Ok(FetchResult::PullRequests(prs))
    }

    fn metadata(&self) -> PluginMetadata {
        let mut config = BTreeMap::new();
        config.insert(
            "github_user".to_string(),
            self.user.clone().unwrap_or_default(),
        );
        config.insert(
            "has_github_token".to_string(),
            self.token.is_some().to_string(),
        );
        self.info.metadata(config)
    }
}
