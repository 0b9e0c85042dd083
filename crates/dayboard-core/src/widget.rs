//! Per-widget display state.
//!
//! Turns [`FetchResult`]s into rows the rendering layer can draw without
//! knowing where they came from. Each slot sits behind its own mutex so
//! concurrent fetches for different widgets never contend.

use crate::plugin::{FetchResult, GitCommit, NewsItem, PullRequest, TrafficReport, WeatherReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

pub const ERROR_GLYPH: &str = "❌";
pub const NO_ITEMS: &str = "No items available";

/// One row in a widget
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DisplayItem {
    pub title: String,
    pub subtitle: String,
    /// Short status glyph, may be empty
    pub status: String,
    pub link: Option<String>,
}

impl DisplayItem {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            ..Self::default()
        }
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        let link = link.into();
        self.link = (!link.is_empty()).then_some(link);
        self
    }
}

/// Display state of one widget, cloned out for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetState {
    pub key: String,
    pub title: String,
    pub count: usize,
    pub has_error: bool,
    pub items: Vec<DisplayItem>,
}

impl WidgetState {
    fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            count: 0,
            has_error: false,
            items: vec![DisplayItem::new("Loading...", "")],
        }
    }

    /// "Title (count)" with the error glyph appended when flagged
    pub fn heading(&self) -> String {
        let mut heading = format!("{} ({})", self.title, self.count);
        if self.has_error {
            heading.push(' ');
            heading.push_str(ERROR_GLYPH);
        }
        heading
    }

    fn rebuild(&mut self, result: &FetchResult) {
        let items = display_items(result);
        self.count = match result {
            FetchResult::NotConfigured { .. } => 0,
            _ => items.len(),
        };
        self.items = if items.is_empty() {
            vec![DisplayItem::new(NO_ITEMS, "")]
        } else {
            items
        };
    }
}

struct Slot {
    key: String,
    state: Mutex<WidgetState>,
}

/// Fixed, ordered set of widget slots
pub struct WidgetBoard {
    slots: Vec<Slot>,
}

impl WidgetBoard {
    /// `widgets` are `(key, title)` pairs in display order
    pub fn new<K, T>(widgets: impl IntoIterator<Item = (K, T)>) -> Self
    where
        K: AsRef<str>,
        T: AsRef<str>,
    {
        let slots = widgets
            .into_iter()
            .map(|(key, title)| Slot {
                key: key.as_ref().to_string(),
                state: Mutex::new(WidgetState::new(key.as_ref(), title.as_ref())),
            })
            .collect();
        Self { slots }
    }

    fn slot(&self, key: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.key == key)
    }

    /// Replace the widget's rows with `result`. Returns `false` for an unknown key.
    pub fn apply_success(&self, key: &str, result: &FetchResult) -> bool {
        let Some(slot) = self.slot(key) else {
            return false;
        };
        let mut state = slot.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.rebuild(result);
        state.has_error = matches!(result, FetchResult::NotConfigured { .. });
        true
    }

    /// Flag the widget as failed, showing `last_good` if there is one and
    /// otherwise keeping whatever it already shows.
    pub fn apply_failure(&self, key: &str, last_good: Option<&FetchResult>) -> bool {
        let Some(slot) = self.slot(key) else {
            return false;
        };
        let mut state = slot.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(result) = last_good {
            state.rebuild(result);
        }
        state.has_error = true;
        true
    }

    pub fn set_title(&self, key: &str, title: impl Into<String>) -> bool {
        let Some(slot) = self.slot(key) else {
            return false;
        };
        slot.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .title = title.into();
        true
    }

    pub fn get(&self, key: &str) -> Option<WidgetState> {
        self.slot(key).map(|s| {
            s.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }

    /// Every widget, in display order
    pub fn snapshot(&self) -> Vec<WidgetState> {
        self.slots
            .iter()
            .map(|s| {
                s.state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            })
            .collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.key.clone()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slot(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ── Formatting ───────────────────────────────────────────────────────────────

/// Rows for a fetch result
pub fn display_items(result: &FetchResult) -> Vec<DisplayItem> {
    let now = Utc::now();
    match result {
        FetchResult::Weather(report) => vec![weather_item(report)],
        FetchResult::News(items) => items.iter().map(news_item).collect(),
        FetchResult::Commits(commits) => commits.iter().map(|c| commit_item(c, now)).collect(),
        FetchResult::PullRequests(prs) => prs.iter().map(|p| pr_item(p, now)).collect(),
        FetchResult::Traffic(report) => traffic_items(report),
        FetchResult::Items(items) => items.clone(),
        FetchResult::NotConfigured { reason } => {
            vec![DisplayItem::new("Not configured", reason.as_str()).status("🔧")]
        }
    }
}

fn weather_item(report: &WeatherReport) -> DisplayItem {
    DisplayItem::new(
        format!("{} {}°C", report.icon, report.temperature),
        format!("{} • {}", report.condition, report.location),
    )
}

fn news_item(item: &NewsItem) -> DisplayItem {
    let subtitle = match item.source.as_str() {
        "hackernews" if item.points > 0 => format!("{} • HN • {} pts", item.author, item.points),
        "hackernews" => format!("{} • HN", item.author),
        "devto" => format!("{} • Dev.to", item.author),
        _ => item.author.clone(),
    };
    DisplayItem::new(item.title.as_str(), subtitle).link(item.url.as_str())
}

fn commit_item(commit: &GitCommit, now: DateTime<Utc>) -> DisplayItem {
    DisplayItem::new(
        commit.message.as_str(),
        format!("{} • {}", time_ago(commit.date, now), commit.repository),
    )
}

fn pr_item(pr: &PullRequest, now: DateTime<Utc>) -> DisplayItem {
    let status = if pr.state == "closed" {
        "🔴"
    } else if pr.draft {
        "🟡"
    } else {
        "🟢"
    };
    DisplayItem::new(
        pr.title.as_str(),
        format!("{} • {}", pr.repository, time_ago(pr.updated_at, now)),
    )
    .status(status)
    .link(pr.url.as_str())
}

fn traffic_items(report: &TrafficReport) -> Vec<DisplayItem> {
    report
        .routes
        .iter()
        .map(|route| {
            let minutes = route.duration_secs.div_ceil(60);
            DisplayItem::new(
                format!("{} → {}", route.from, route.to),
                format!("{} min • {:.1} km", minutes, route.distance_meters / 1000.0),
            )
            .status("🚗")
        })
        .collect()
}

/// Relative age such as "5 minutes ago"; older than a week shows the date
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(then);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };
    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        plural(diff.num_minutes(), "minute")
    } else if diff.num_days() < 1 {
        plural(diff.num_hours(), "hour")
    } else if diff.num_days() < 7 {
        plural(diff.num_days(), "day")
    } else {
        then.format("%b %-d").to_string()
    }
}
