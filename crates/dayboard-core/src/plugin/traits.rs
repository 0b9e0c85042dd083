use super::{FetchClass, FetchContext, FetchResult, PluginError, PluginMetadata};
use std::future::Future;
use std::pin::Pin;

/// Core plugin trait. Every data source implements this.
///
/// Lifecycle: configure() → fetch()* → teardown()
///
/// `configure` runs once before the plugin is shared; everything after that
/// takes `&self`, so state a plugin mutates during its life (tags, caches)
/// sits behind its own locks.
///
/// Uses RPITIT (Return Position Impl Trait in Traits) with explicit Send bounds.
pub trait Plugin: Send + Sync {
    /// Stable, non-empty registry key.
    fn identity(&self) -> &str;

    /// Coarse grouping such as "news" or "weather".
    fn category(&self) -> &str;

    /// Apply a configuration snapshot. Unknown keys are ignored; only options
    /// the plugin cannot work without produce `PluginError::Configuration`.
    fn configure(&mut self, options: &toml::Table) -> Result<(), PluginError>;

    /// Perform the external call. Must return promptly once `ctx` is cancelled.
    fn fetch(
        &self,
        ctx: FetchContext,
    ) -> impl Future<Output = Result<FetchResult, PluginError>> + Send;

    /// Return plugin identity and descriptive information.
    fn metadata(&self) -> PluginMetadata;

    /// Release held resources. Must tolerate repeated calls.
    fn teardown(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// I/O class used to pick the fetch deadline.
    fn fetch_class(&self) -> FetchClass {
        FetchClass::Network
    }

    /// Tag-filtering capability, if the plugin has one.
    fn as_taggable(&self) -> Option<&dyn Taggable> {
        None
    }
}

/// Tag filtering shared by news-style plugins
pub trait Taggable: Send + Sync {
    /// Replace the configured tag list.
    fn set_tags(&self, tags: Vec<String>);

    /// Active filter; "all" when unfiltered.
    fn current_tag(&self) -> String;

    fn set_current_tag(&self, tag: &str);

    /// Tags this source can filter on, starting with "all".
    fn supported_tags(&self) -> Vec<String>;
}

/// Object-safe version of Plugin for type erasure in handles.
///
/// This trait is implemented automatically for all types that implement Plugin.
pub trait ErasedPlugin: Send + Sync {
    fn identity(&self) -> &str;
    fn category(&self) -> &str;
    fn configure(&mut self, options: &toml::Table) -> Result<(), PluginError>;
    fn fetch<'a>(
        &'a self,
        ctx: FetchContext,
    ) -> Pin<Box<dyn Future<Output = Result<FetchResult, PluginError>> + Send + 'a>>;
    fn metadata(&self) -> PluginMetadata;
    fn teardown(&self) -> Result<(), PluginError>;
    fn fetch_class(&self) -> FetchClass;
    fn as_taggable(&self) -> Option<&dyn Taggable>;
}

/// Blanket implementation of ErasedPlugin for all Plugin types.
impl<T: Plugin> ErasedPlugin for T {
    fn identity(&self) -> &str {
        Plugin::identity(self)
    }

    fn category(&self) -> &str {
        Plugin::category(self)
    }

    fn configure(&mut self, options: &toml::Table) -> Result<(), PluginError> {
        Plugin::configure(self, options)
    }

    fn fetch<'a>(
        &'a self,
        ctx: FetchContext,
    ) -> Pin<Box<dyn Future<Output = Result<FetchResult, PluginError>> + Send + 'a>> {
        Box::pin(Plugin::fetch(self, ctx))
    }

    fn metadata(&self) -> PluginMetadata {
        Plugin::metadata(self)
    }

    fn teardown(&self) -> Result<(), PluginError> {
        Plugin::teardown(self)
    }

    fn fetch_class(&self) -> FetchClass {
        Plugin::fetch_class(self)
    }

    fn as_taggable(&self) -> Option<&dyn Taggable> {
        Plugin::as_taggable(self)
    }
}
