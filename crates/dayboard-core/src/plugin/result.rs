//! Typed fetch results.
//!
//! Every plugin returns one [`FetchResult`] variant, so consumers branch with
//! an exhaustive `match` instead of inspecting the concrete payload type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::widget::DisplayItem;

/// Result of a successful `fetch`, one variant per source family
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum FetchResult {
    Weather(WeatherReport),
    News(Vec<NewsItem>),
    Commits(Vec<GitCommit>),
    PullRequests(Vec<PullRequest>),
    Traffic(TrafficReport),
    /// Pre-rendered rows, used by placeholder widgets
    Items(Vec<DisplayItem>),
    /// Returned without I/O by a plugin whose configuration was rejected
    NotConfigured { reason: String },
}

impl FetchResult {
    /// Number of entries carried by the result
    pub fn len(&self) -> usize {
        match self {
            Self::Weather(_) => 1,
            Self::News(items) => items.len(),
            Self::Commits(commits) => commits.len(),
            Self::PullRequests(prs) => prs.len(),
            Self::Traffic(report) => report.routes.len(),
            Self::Items(items) => items.len(),
            Self::NotConfigured { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short variant label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Weather(_) => "weather",
            Self::News(_) => "news",
            Self::Commits(_) => "commits",
            Self::PullRequests(_) => "pull_requests",
            Self::Traffic(_) => "traffic",
            Self::Items(_) => "items",
            Self::NotConfigured { .. } => "not_configured",
        }
    }
}

/// Current conditions for a single location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub location: String,
    /// Whole degrees Celsius
    pub temperature: i32,
    pub condition: String,
    pub icon: String,
}

/// A news article or story
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub author: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Identity of the plugin that produced the item (e.g. `"hackernews"`)
    pub source: String,
    pub points: u32,
    pub created_at: Option<DateTime<Utc>>,
}

/// A commit from a local repository
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GitCommit {
    /// Short (8 character) hash
    pub hash: String,
    pub message: String,
    pub author: String,
    pub date: DateTime<Utc>,
    pub repository: String,
}

/// A pull request on a hosted forge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub author: String,
    pub repository: String,
    pub url: String,
    pub draft: bool,
    pub updated_at: DateTime<Utc>,
}

/// Travel time between two points, in one or both directions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficReport {
    pub routes: Vec<RouteEstimate>,
}

/// Estimate for one direction of travel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEstimate {
    pub from: String,
    pub to: String,
    pub duration_secs: u64,
    pub distance_meters: f64,
}
