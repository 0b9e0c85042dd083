//! Helper structs that concrete plugins hold by value and delegate to.

use super::{PluginMetadata, Taggable};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Identity and descriptive fields shared by every plugin
#[derive(Debug, Clone)]
pub struct PluginInfo {
    identity: String,
    category: String,
    name: String,
    version: String,
    description: String,
    author: String,
}

impl PluginInfo {
    pub fn new(identity: impl Into<String>, category: impl Into<String>) -> Self {
        let identity = identity.into();
        Self {
            name: identity.clone(),
            identity,
            category: category.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: String::new(),
            author: "dayboard".to_string(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Build metadata with the given config description map
    pub fn metadata(&self, config: BTreeMap<String, String>) -> PluginMetadata {
        PluginMetadata {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
            config,
        }
    }
}

/// Sentinel tag meaning "no filter"
pub const ALL_TAG: &str = "all";

#[derive(Debug)]
struct Tags {
    configured: Vec<String>,
    current: String,
    supported: Vec<String>,
}

/// Lock-guarded tag state backing a `Taggable` implementation
#[derive(Debug)]
pub struct TagState {
    inner: RwLock<Tags>,
}

impl TagState {
    /// `supported` lists the source's own tags; "all" is prepended if missing.
    pub fn new(supported: Vec<String>) -> Self {
        let mut all = vec![ALL_TAG.to_string()];
        all.extend(supported.into_iter().filter(|t| t != ALL_TAG));
        Self {
            inner: RwLock::new(Tags {
                configured: Vec::new(),
                current: ALL_TAG.to_string(),
                supported: all,
            }),
        }
    }

    pub fn set_tags(&self, tags: Vec<String>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .configured = tags;
    }

    pub fn tags(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .configured
            .clone()
    }

    pub fn current_tag(&self) -> String {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    /// Empty or "All" (any case) resets to the sentinel
    pub fn set_current_tag(&self, tag: &str) {
        let tag = tag.trim();
        let value = if tag.is_empty() || tag.eq_ignore_ascii_case(ALL_TAG) {
            ALL_TAG.to_string()
        } else {
            tag.to_string()
        };
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .current = value;
    }

    pub fn supported_tags(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .supported
            .clone()
    }

    pub fn set_supported_tags(&self, supported: Vec<String>) {
        let mut all = vec![ALL_TAG.to_string()];
        for tag in supported {
            if !all.contains(&tag) {
                all.push(tag);
            }
        }
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .supported = all;
    }

    /// `true` when the current tag filters nothing
    pub fn is_unfiltered(&self) -> bool {
        self.current_tag() == ALL_TAG
    }
}

impl Taggable for TagState {
    fn set_tags(&self, tags: Vec<String>) {
        TagState::set_tags(self, tags);
    }

    fn current_tag(&self) -> String {
        TagState::current_tag(self)
    }

    fn set_current_tag(&self, tag: &str) {
        TagState::set_current_tag(self, tag);
    }

    fn supported_tags(&self) -> Vec<String> {
        TagState::supported_tags(self)
    }
}

impl Default for TagState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
