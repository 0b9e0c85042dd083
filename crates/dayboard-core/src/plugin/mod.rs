pub mod base;
pub mod context;
pub mod handle;
pub mod registry;
pub mod result;
pub mod traits;
pub mod types;

pub use base::{ALL_TAG, PluginInfo, TagState};
pub use context::FetchContext;
pub use handle::{PluginHandle, SharedPlugin};
pub use registry::{PluginRegistry, RegistryError};
pub use result::{
    FetchResult, GitCommit, NewsItem, PullRequest, RouteEstimate, TrafficReport, WeatherReport,
};
pub use traits::{ErasedPlugin, Plugin, Taggable};
pub use types::{FetchClass, PluginError, PluginMetadata, PluginState};
