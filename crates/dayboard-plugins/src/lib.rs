//! Data source plugins for dayboard
//!
//! Each module holds one [`dayboard_core::Plugin`] implementation. Network
//! sources share the client built in [`http`]; [`catalog::build_manager`]
//! constructs the full set from a loaded configuration.

pub mod catalog;
pub mod git_commits;
pub mod github_prs;
pub mod http;
pub mod news;
pub mod options;
pub mod placeholder;
pub mod traffic;
pub mod weather;

pub use git_commits::LocalGitCommitsPlugin;
pub use github_prs::GitHubPrsPlugin;
pub use news::{DevToPlugin, HackerNewsPlugin};
pub use placeholder::PlaceholderPlugin;
pub use traffic::OsrmTrafficPlugin;
pub use weather::WeatherPlugin;
