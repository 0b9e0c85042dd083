use super::{PluginError, PluginMetadata, SharedPlugin};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Registry misuse, returned to the wiring code
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("plugin '{0}' is already registered")]
    DuplicateIdentity(String),

    #[error("plugin '{0}' is not registered")]
    NotFound(String),

    #[error("plugin '{identity}' was removed but its teardown failed")]
    Teardown {
        identity: String,
        #[source]
        source: PluginError,
    },
}

/// Holds every registered plugin, by identity and by category
pub struct PluginRegistry {
    /// Insertion ordered
    plugins: Vec<SharedPlugin>,
    /// category → taggable plugins, insertion ordered
    taggable: HashMap<String, Vec<SharedPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            taggable: HashMap::new(),
        }
    }

    /// Register a plugin. Taggable plugins are also indexed by category.
    pub fn register(&mut self, plugin: SharedPlugin) -> Result<(), RegistryError> {
        let identity = plugin.identity().to_string();
        if self.lookup(&identity).is_some() {
            return Err(RegistryError::DuplicateIdentity(identity));
        }
        if plugin.as_taggable().is_some() {
            self.taggable
                .entry(plugin.category().to_string())
                .or_default()
                .push(plugin.clone());
        }
        debug!(plugin = %identity, category = plugin.category(), "Registered plugin");
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn lookup(&self, identity: &str) -> Option<SharedPlugin> {
        self.plugins
            .iter()
            .find(|p| p.identity() == identity)
            .cloned()
    }

    /// All plugins in `category`, taggable or not, in registration order
    pub fn lookup_by_category(&self, category: &str) -> Vec<SharedPlugin> {
        self.plugins
            .iter()
            .filter(|p| p.category() == category)
            .cloned()
            .collect()
    }

    /// Taggable plugins in `category`, in registration order
    pub fn taggable_in(&self, category: &str) -> Vec<SharedPlugin> {
        self.taggable.get(category).cloned().unwrap_or_default()
    }

    /// Every taggable plugin, in registration order
    pub fn all_taggable(&self) -> Vec<SharedPlugin> {
        self.plugins
            .iter()
            .filter(|p| p.as_taggable().is_some())
            .cloned()
            .collect()
    }

    /// Tear a plugin down and remove it.
    ///
    /// Removal from both indexes happens whatever the teardown outcome; a
    /// teardown failure is reported afterwards.
    pub fn unregister(&mut self, identity: &str) -> Result<SharedPlugin, RegistryError> {
        let Some(pos) = self.plugins.iter().position(|p| p.identity() == identity) else {
            return Err(RegistryError::NotFound(identity.to_string()));
        };

        let plugin = self.plugins[pos].clone();
        let teardown = plugin.teardown();

        self.plugins.remove(pos);
        if let Some(list) = self.taggable.get_mut(plugin.category()) {
            list.retain(|p| p.identity() != identity);
            if list.is_empty() {
                self.taggable.remove(plugin.category());
            }
        }

        match teardown {
            Ok(()) => Ok(plugin),
            Err(source) => Err(RegistryError::Teardown {
                identity: identity.to_string(),
                source,
            }),
        }
    }

    /// Snapshot of every plugin's metadata, in registration order
    pub fn list_metadata(&self) -> Vec<PluginMetadata> {
        self.plugins.iter().map(|p| p.metadata()).collect()
    }

    /// Tear down every plugin, keeping them registered.
    /// Returns the number of failed teardowns.
    pub fn teardown_all(&self) -> usize {
        let mut failed = 0;
        for plugin in &self.plugins {
            if let Err(e) = plugin.teardown() {
                warn!(plugin = plugin.identity(), "Teardown failed: {e}");
                failed += 1;
            }
        }
        failed
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedPlugin> {
        self.plugins.iter()
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
