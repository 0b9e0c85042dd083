//! The built-in widget layout and the plugins that feed it.

use crate::git_commits::{GIT_COMMITS_IDENTITY, LocalGitCommitsPlugin};
use crate::github_prs::{GITHUB_PRS_IDENTITY, GitHubPrsPlugin};
use crate::news::{DEVTO_IDENTITY, DevToPlugin, HACKERNEWS_IDENTITY, HackerNewsPlugin};
use crate::placeholder::{PlaceholderPlugin, placeholder_identity};
use crate::traffic::{OsrmTrafficPlugin, TRAFFIC_IDENTITY};
use crate::weather::{WEATHER_IDENTITY, WeatherPlugin};
use dayboard_core::aggregate::{AGGREGATE_IDENTITY, AggregatePlugin};
use dayboard_core::config::DashboardConfig;
use dayboard_core::manager::PluginManager;
use dayboard_core::plugin::RegistryError;
use dayboard_core::widget::WidgetBoard;
use std::borrow::Cow;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Where a widget's rows come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A registered plugin identity
    Plugin(&'static str),
    /// Static rows from a [`PlaceholderPlugin`]
    Placeholder,
}

#[derive(Debug, Clone, Copy)]
pub struct WidgetDef {
    pub key: &'static str,
    pub title: &'static str,
    /// Refresh interval unless `[widgets.<key>] ttl` overrides it
    pub ttl: Duration,
    pub source: Source,
}

impl WidgetDef {
    pub fn identity(&self) -> Cow<'static, str> {
        match self.source {
            Source::Plugin(id) => Cow::Borrowed(id),
            Source::Placeholder => Cow::Owned(placeholder_identity(self.key)),
        }
    }
}

const fn widget(key: &'static str, title: &'static str, secs: u64, source: Source) -> WidgetDef {
    WidgetDef {
        key,
        title,
        ttl: Duration::from_secs(secs),
        source,
    }
}

/// Header widget shown as a pill rather than a grid cell
pub const WEATHER_WIDGET: &str = "weather";
pub const NEWS_WIDGET: &str = "news";
/// Category shared by every taggable news source
pub const NEWS_CATEGORY: &str = "news";

/// Every widget, weather first, then the grid in reading order
pub const WIDGETS: &[WidgetDef] = &[
    widget(WEATHER_WIDGET, "Weather", 600, Source::Plugin(WEATHER_IDENTITY)),
    widget("jira", "JIRA", 45, Source::Placeholder),
    widget("prs", "PRs", 300, Source::Plugin(GITHUB_PRS_IDENTITY)),
    widget("builds", "Builds", 120, Source::Placeholder),
    widget("commits", "Commits", 300, Source::Plugin(GIT_COMMITS_IDENTITY)),
    widget("calendar", "Calendar", 300, Source::Placeholder),
    widget("slack", "Slack", 20, Source::Placeholder),
    widget("todos", "Todos", 300, Source::Placeholder),
    widget("confluence", "Confluence", 300, Source::Placeholder),
    widget("pagerduty", "PagerDuty", 60, Source::Placeholder),
    widget(NEWS_WIDGET, "Tech News", 600, Source::Plugin(AGGREGATE_IDENTITY)),
    widget("traffic", "Traffic", 300, Source::Plugin(TRAFFIC_IDENTITY)),
];

/// Grid widgets in reading order
pub fn grid_keys() -> impl Iterator<Item = &'static str> {
    WIDGETS
        .iter()
        .map(|w| w.key)
        .filter(|k| *k != WEATHER_WIDGET)
}

pub fn board(config: &DashboardConfig) -> WidgetBoard {
    WidgetBoard::new(
        WIDGETS
            .iter()
            .map(|w| (w.key, config.widget_title(w.key).unwrap_or(w.title))),
    )
}

/// Register every built-in plugin with its `[plugins.<identity>]` options.
///
/// A plugin that rejects its options stays registered but inactive.
pub fn register_plugins(
    manager: &PluginManager,
    config: &DashboardConfig,
) -> Result<(), RegistryError> {
    let options = |identity: &str| config.plugin_options(identity);

    manager.register_configured(
        WeatherPlugin::new(config.user.location.clone()),
        &options(WEATHER_IDENTITY),
    )?;

    let hackernews =
        manager.register_configured(HackerNewsPlugin::new(), &options(HACKERNEWS_IDENTITY))?;
    let devto = manager.register_configured(DevToPlugin::new(), &options(DEVTO_IDENTITY))?;
    manager.register_configured(
        AggregatePlugin::new(vec![hackernews, devto]),
        &options(AGGREGATE_IDENTITY),
    )?;
    manager.set_category_tags(NEWS_CATEGORY, &config.news_tags());

    manager.register_configured(LocalGitCommitsPlugin::new(), &options(GIT_COMMITS_IDENTITY))?;
    manager.register_configured(GitHubPrsPlugin::new(), &options(GITHUB_PRS_IDENTITY))?;
    manager.register_configured(OsrmTrafficPlugin::new(), &options(TRAFFIC_IDENTITY))?;

    for def in WIDGETS.iter().filter(|w| w.source == Source::Placeholder) {
        manager.register_configured(PlaceholderPlugin::new(def.key), &options(&def.identity()))?;
    }
    Ok(())
}

/// One task per widget, named after the widget
pub fn schedule_widgets(
    manager: &PluginManager,
    config: &DashboardConfig,
) -> Result<(), RegistryError> {
    for def in WIDGETS {
        let interval = config.widget_ttl(def.key, def.ttl);
        manager.schedule(def.key, def.key, interval, Some(&def.identity()))?;
    }
    Ok(())
}

/// Board, plugins and tasks for `config`, not yet started
pub fn build_manager(
    config: &DashboardConfig,
    cancel: CancellationToken,
) -> Result<PluginManager, RegistryError> {
    let manager = PluginManager::with_cancel(board(config), cancel);
    register_plugins(&manager, config)?;
    schedule_widgets(&manager, config)?;
    info!(
        plugins = manager.list_metadata().len(),
        tasks = manager.task_names().len(),
        "Dashboard assembled"
    );
    Ok(manager)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dayboard_core::plugin::PluginState;

    fn config(src: &str) -> DashboardConfig {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn test_grid_excludes_weather() {
        let keys: Vec<_> = grid_keys().collect();
        assert_eq!(keys.len(), WIDGETS.len() - 1);
        assert_eq!(keys[0], "jira");
        assert!(!keys.contains(&WEATHER_WIDGET));
    }

    #[tokio::test]
    async fn test_build_manager_schedules_every_widget() {
        let manager = build_manager(&DashboardConfig::default(), CancellationToken::new()).unwrap();
        let tasks = manager.task_names();
        assert_eq!(tasks.len(), WIDGETS.len());
        for def in WIDGETS {
            assert!(tasks.contains(&def.key.to_string()), "missing {}", def.key);
            assert!(manager.lookup(&def.identity()).is_some());
        }
        assert!(manager.lookup(HACKERNEWS_IDENTITY).is_some());
        assert!(manager.lookup(DEVTO_IDENTITY).is_some());
    }

    #[tokio::test]
    async fn test_weather_without_key_is_inactive() {
        let manager = build_manager(&DashboardConfig::default(), CancellationToken::new()).unwrap();
        let weather = manager.lookup(WEATHER_IDENTITY).unwrap();
        assert!(matches!(weather.state(), PluginState::Inactive { .. }));
        assert!(manager.lookup(AGGREGATE_IDENTITY).unwrap().is_active());
    }

    #[tokio::test]
    async fn test_news_tags_and_titles_come_from_config() {
        let cfg = config(
            "[widgets.news]\ntags = ['rust']\ntitle = 'Reading'\n\
             [plugins.openweathermap]\napi_key = 'k'",
        );
        let manager = build_manager(&cfg, CancellationToken::new()).unwrap();

        let hn = manager.lookup(HACKERNEWS_IDENTITY).unwrap();
        assert!(manager.lookup(WEATHER_IDENTITY).unwrap().is_active());
        assert_eq!(manager.board().get(NEWS_WIDGET).unwrap().title, "Reading");

        assert_eq!(hn.as_taggable().unwrap().current_tag(), "all");
        assert_eq!(manager.set_category_tag(NEWS_CATEGORY, "rust").len(), 3);
        assert_eq!(hn.as_taggable().unwrap().current_tag(), "rust");
    }
}
