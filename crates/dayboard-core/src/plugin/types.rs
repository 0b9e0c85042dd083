use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Plugin metadata: identity and descriptive information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub category: String,
    /// Configuration key → human-readable value or description
    pub config: BTreeMap<String, String>,
}

/// Plugin lifecycle state, tracked by the handle that wraps each plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginState {
    /// Configured and fetching normally
    Active,
    /// `configure` rejected the options; fetch short-circuits with this reason
    Inactive { reason: String },
    /// `teardown` has run
    TornDown,
}

/// Plugin errors with structured variants
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("plugin configuration error: {message}")]
    Configuration { message: String },

    #[error("fetch failed: {message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("fetch timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("fetch cancelled")]
    Cancelled,

    #[error("plugin panicked: {message}")]
    Panicked { message: String },

    #[error("plugin teardown failed: {message}")]
    Teardown {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PluginError {
    /// Shorthand for a sourceless configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for a fetch error without an underlying cause
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error as a fetch failure
    pub fn fetch_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fetch {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// `true` for failures that the next scheduled run may clear
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::Timeout { .. } | Self::Cancelled | Self::Panicked { .. }
        )
    }
}

/// I/O class of a plugin's fetch, which decides its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchClass {
    /// Remote HTTP APIs
    #[default]
    Network,
    /// Filesystem or subprocess work on this machine
    Local,
}

impl FetchClass {
    pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(30);
    pub const LOCAL_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn timeout(self) -> Duration {
        match self {
            Self::Network => Self::NETWORK_TIMEOUT,
            Self::Local => Self::LOCAL_TIMEOUT,
        }
    }
}
