use super::traits::ErasedPlugin;
use super::{
    FetchClass, FetchContext, FetchResult, Plugin, PluginError, PluginMetadata, PluginState,
    Taggable,
};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Shared reference to a registered plugin. Tasks and the registry hold
/// clones; the plugin is torn down by whoever unregisters it.
pub type SharedPlugin = Arc<PluginHandle>;

/// A type-erased plugin plus the per-plugin state the core tracks for it
pub struct PluginHandle {
    plugin: Box<dyn ErasedPlugin>,
    state: Mutex<PluginState>,
    last_good: Mutex<Option<FetchResult>>,
}

impl PluginHandle {
    /// Wrap an already-configured plugin
    pub fn new<P: Plugin + 'static>(plugin: P) -> Self {
        Self {
            plugin: Box::new(plugin),
            state: Mutex::new(PluginState::Active),
            last_good: Mutex::new(None),
        }
    }

    /// Configure `plugin` with `options` and wrap it.
    ///
    /// A rejected configuration is logged here, once, and leaves the handle
    /// inactive so later fetches short-circuit without I/O.
    pub fn configured<P: Plugin + 'static>(mut plugin: P, options: &toml::Table) -> Self {
        let state = match Plugin::configure(&mut plugin, options) {
            Ok(()) => PluginState::Active,
            Err(e) => {
                warn!(
                    plugin = Plugin::identity(&plugin),
                    "Plugin disabled: {e}"
                );
                PluginState::Inactive {
                    reason: e.to_string(),
                }
            }
        };
        Self {
            plugin: Box::new(plugin),
            state: Mutex::new(state),
            last_good: Mutex::new(None),
        }
    }

    /// Convenience for `Arc::new(PluginHandle::new(plugin))`
    pub fn shared<P: Plugin + 'static>(plugin: P) -> SharedPlugin {
        Arc::new(Self::new(plugin))
    }

    pub fn identity(&self) -> &str {
        self.plugin.identity()
    }

    pub fn category(&self) -> &str {
        self.plugin.category()
    }

    pub fn metadata(&self) -> PluginMetadata {
        self.plugin.metadata()
    }

    pub fn fetch_class(&self) -> FetchClass {
        self.plugin.fetch_class()
    }

    pub fn as_taggable(&self) -> Option<&dyn Taggable> {
        self.plugin.as_taggable()
    }

    pub fn state(&self) -> PluginState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state(), PluginState::Active)
    }

    /// Fetch through the plugin, or report why it is not fetching.
    ///
    /// Does not touch the last-known-good slot; the dispatcher records
    /// successes with [`PluginHandle::record_success`].
    pub async fn fetch(&self, ctx: FetchContext) -> Result<FetchResult, PluginError> {
        match self.state() {
            PluginState::Active => self.plugin.fetch(ctx).await,
            PluginState::Inactive { reason } => Ok(FetchResult::NotConfigured { reason }),
            PluginState::TornDown => Ok(FetchResult::NotConfigured {
                reason: format!("{} has been shut down", self.identity()),
            }),
        }
    }

    /// Store a successful result as this plugin's last-known-good value
    pub fn record_success(&self, result: &FetchResult) {
        if matches!(result, FetchResult::NotConfigured { .. }) {
            return;
        }
        *self
            .last_good
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(result.clone());
    }

    pub fn last_good(&self) -> Option<FetchResult> {
        self.last_good
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tear the plugin down. Only the first call reaches the plugin.
    pub fn teardown(&self) -> Result<(), PluginError> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state == PluginState::TornDown {
                debug!(plugin = self.identity(), "Teardown already done");
                return Ok(());
            }
            *state = PluginState::TornDown;
        }
        self.plugin.teardown()
    }
}

impl std::fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHandle")
            .field("identity", &self.identity())
            .field("category", &self.category())
            .field("state", &self.state())
            .finish()
    }
}
