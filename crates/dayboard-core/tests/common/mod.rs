#![allow(dead_code)]

use dayboard_core::plugin::{
    FetchClass, FetchContext, FetchResult, NewsItem, Plugin, PluginError, PluginInfo,
    PluginMetadata, TagState, Taggable,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock plugins
// ============================================================================

/// What the next fetch does
#[derive(Debug, Clone)]
pub enum Mode {
    /// Return these news items
    News(Vec<NewsItem>),
    /// Return an empty `Items` result
    Items,
    /// Return a fetch error
    Fail,
    /// Never return, ignoring the context
    Hang,
    /// Never return on its own, but give up when the context does
    Stall,
    /// Panic inside fetch
    Panic,
}

/// Shared knobs and counters for a [`MockPlugin`]
#[derive(Debug, Clone)]
pub struct Control {
    pub mode: Arc<Mutex<Mode>>,
    pub fetches: Arc<AtomicUsize>,
    pub teardowns: Arc<AtomicUsize>,
    pub seen_tags: Arc<Mutex<Vec<String>>>,
}

impl Control {
    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn teardown_count(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }

    pub fn last_seen_tag(&self) -> Option<String> {
        self.seen_tags.lock().unwrap().last().cloned()
    }
}

pub struct MockPlugin {
    info: PluginInfo,
    control: Control,
    class: FetchClass,
    fail_teardown: bool,
    tags: Option<TagState>,
}

impl MockPlugin {
    pub fn new(identity: &str, category: &str, mode: Mode) -> (Self, Control) {
        let control = Control {
            mode: Arc::new(Mutex::new(mode)),
            fetches: Arc::new(AtomicUsize::new(0)),
            teardowns: Arc::new(AtomicUsize::new(0)),
            seen_tags: Arc::new(Mutex::new(Vec::new())),
        };
        let plugin = Self {
            info: PluginInfo::new(identity, category).description("Mock plugin for testing"),
            control: control.clone(),
            class: FetchClass::Network,
            fail_teardown: false,
            tags: None,
        };
        (plugin, control)
    }

    /// A taggable news source returning `items`
    pub fn news(identity: &str, items: Vec<NewsItem>, supported: &[&str]) -> (Self, Control) {
        let (mut plugin, control) = Self::new(identity, "news", Mode::News(items));
        plugin.tags = Some(TagState::new(
            supported.iter().map(|s| s.to_string()).collect(),
        ));
        (plugin, control)
    }

    pub fn local(mut self) -> Self {
        self.class = FetchClass::Local;
        self
    }

    pub fn failing_teardown(mut self) -> Self {
        self.fail_teardown = true;
        self
    }
}

impl Plugin for MockPlugin {
    fn identity(&self) -> &str {
        self.info.identity()
    }

    fn category(&self) -> &str {
        self.info.category()
    }

    fn configure(&mut self, _options: &toml::Table) -> Result<(), PluginError> {
        Ok(())
    }

    async fn fetch(&self, ctx: FetchContext) -> Result<FetchResult, PluginError> {
        self.control.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(tags) = &self.tags {
            self.control
                .seen_tags
                .lock()
                .unwrap()
                .push(tags.current_tag());
        }
        let mode = self.control.mode.lock().unwrap().clone();
        match mode {
            Mode::News(items) => Ok(FetchResult::News(items)),
            Mode::Items => Ok(FetchResult::Items(vec![])),
            Mode::Fail => Err(PluginError::fetch("mock failure")),
            Mode::Hang => std::future::pending().await,
            Mode::Stall => ctx.run(std::future::pending()).await,
            Mode::Panic => panic!("mock plugin panicked"),
        }
    }

    fn metadata(&self) -> PluginMetadata {
        self.info.metadata(BTreeMap::new())
    }

    fn teardown(&self) -> Result<(), PluginError> {
        self.control.teardowns.fetch_add(1, Ordering::SeqCst);
        if self.fail_teardown {
            return Err(PluginError::Teardown {
                message: "socket still open".into(),
                source: None,
            });
        }
        Ok(())
    }

    fn fetch_class(&self) -> FetchClass {
        self.class
    }

    fn as_taggable(&self) -> Option<&dyn Taggable> {
        self.tags.as_ref().map(|t| t as &dyn Taggable)
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn item(title: &str) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        url: format!("https://news.example/{}", title.replace(' ', "-")),
        author: "tester".to_string(),
        source: "mock".to_string(),
        ..NewsItem::default()
    }
}

pub fn items(prefix: &str, n: usize) -> Vec<NewsItem> {
    (0..n).map(|i| item(&format!("{prefix} {i}"))).collect()
}
