//! Polling scheduler and plugin-dispatch core for the dayboard dashboard
//!
//! Data sources implement [`plugin::Plugin`] and are registered with a
//! [`manager::PluginManager`]. Named tasks bind a plugin to a refresh interval
//! and a widget; the [`dispatcher::Dispatcher`] runs due tasks each second and
//! folds their results into the [`widget::WidgetBoard`] the UI reads.

pub mod aggregate;
pub mod config;
pub mod dispatcher;
pub mod home;
pub mod logging;
pub mod manager;
pub mod plugin;
pub mod scheduler;
pub mod tags;
pub mod widget;

pub use aggregate::AggregatePlugin;
pub use dispatcher::{Dispatcher, TaskOutcome};
pub use manager::PluginManager;
pub use plugin::{
    FetchContext, FetchResult, Plugin, PluginError, PluginHandle, PluginRegistry, SharedPlugin,
    Taggable,
};
pub use scheduler::TaskScheduler;
pub use widget::{DisplayItem, WidgetBoard, WidgetState};

// Re-export toml for plugin config access
pub use toml;
