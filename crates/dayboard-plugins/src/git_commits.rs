//! Recent commits by the current author across local repositories.

use crate::options;
use chrono::{DateTime, Utc};
use dayboard_core::home::get_home_dir;
use dayboard_core::plugin::{
    FetchClass, FetchContext, FetchResult, GitCommit, Plugin, PluginError, PluginInfo,
    PluginMetadata,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

pub const GIT_COMMITS_IDENTITY: &str = "local-git-commits";

/// Commits shown after merging every repository
pub const MAX_COMMITS: usize = 10;
/// Commits read from each repository
const PER_REPO: &str = "-20";
/// Unit separator; commit subjects may contain any printable character
const FIELD_SEP: char = '\u{1f}';
const LOG_FORMAT: &str = "--format=%H%x1f%s%x1f%an%x1f%ad";

const DEFAULT_REPOSITORIES: &[&str] = &[
    ".",
    "~/Development",
    "~/Projects",
    "~/src",
    "~/code",
    "~/workspace",
];

pub struct LocalGitCommitsPlugin {
    info: PluginInfo,
    repositories: Vec<String>,
    author: OnceCell<String>,
}

impl LocalGitCommitsPlugin {
    pub fn new() -> Self {
        Self {
            info: PluginInfo::new(GIT_COMMITS_IDENTITY, "git")
                .name("Local Git Commits")
                .description("Recent commits from local Git repositories"),
            repositories: DEFAULT_REPOSITORIES.iter().map(|r| r.to_string()).collect(),
            author: OnceCell::new(),
        }
    }

    /// Configured author, else `git config --global user.name`, else "" (no filter)
    async fn author(&self) -> &str {
        self.author
            .get_or_init(|| async {
                let name = git_config("user.name").await.unwrap_or_default();
                debug!(author = %name, "Resolved commit author from git config");
                name
            })
            .await
    }
}

impl Default for LocalGitCommitsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace a leading `~/` with the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match get_home_dir() {
            Ok(home) => home.join(rest),
            Err(_) => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

fn repository_name(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    match resolved.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}

async fn git_config(key: &str) -> Option<String> {
    let output = Command::new("git")
        .args(["config", "--global", key])
        .kill_on_drop(true)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Parse `git log` output in [`LOG_FORMAT`] with `--date=iso-strict`.
/// Malformed lines are skipped.
pub fn parse_log(output: &str, repository: &str) -> Vec<GitCommit> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split(FIELD_SEP);
            let hash = fields.next()?;
            let message = fields.next()?;
            let author = fields.next()?;
            let date = fields.next()?;
            if hash.is_empty() || fields.next().is_some() {
                return None;
            }
            let date = DateTime::parse_from_rfc3339(date.trim()).ok()?;
            Some(GitCommit {
                hash: hash.get(..8).unwrap_or(hash).to_string(),
                message: message.to_string(),
                author: author.to_string(),
                date: date.with_timezone(&Utc),
                repository: repository.to_string(),
            })
        })
        .collect()
}

/// Exact or substring match; an empty author keeps everything
fn authored_by(commit: &GitCommit, author: &str) -> bool {
    author.is_empty() || commit.author == author || commit.author.contains(author)
}

async fn read_repository(path: &Path) -> Result<Vec<GitCommit>, PluginError> {
    if !path.join(".git").exists() {
        return Err(PluginError::fetch(format!(
            "not a git repository: {}",
            path.display()
        )));
    }

    let output = Command::new("git")
        .arg("-C")
        .arg(path)
        .args(["log", LOG_FORMAT, "--date=iso-strict", PER_REPO])
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| PluginError::fetch_with("failed to run git log", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PluginError::fetch(format!(
            "git log failed in {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_log(&stdout, &repository_name(path)))
}

impl Plugin for LocalGitCommitsPlugin {
    fn identity(&self) -> &str {
        self.info.identity()
    }

    fn category(&self) -> &str {
        self.info.category()
    }

    fn configure(&mut self, options: &toml::Table) -> Result<(), PluginError> {
        if let Some(repositories) = options::string_list(options, "repositories")? {
            self.repositories = repositories;
        }
        if let Some(author) = options::string(options, "author") {
            self.author = OnceCell::new_with(Some(author));
        }
        Ok(())
    }

    async fn fetch(&self, ctx: FetchContext) -> Result<FetchResult, PluginError> {
        ctx.run(async {
            let author = self.author().await;
            let mut commits = Vec::new();
            for repository in &self.repositories {
                let path = expand_tilde(repository);
                match read_repository(&path).await {
                    Ok(found) => commits.extend(found),
                    Err(e) => debug!(repository = %path.display(), "Skipping repository: {e}"),
                }
            }

            let mut commits: Vec<_> = commits
                .into_iter()
                .filter(|c| authored_by(c, author))
                .collect();
            commits.sort_by(|a, b| b.date.cmp(&a.date));
            commits.truncate(MAX_COMMITS);

            if commits.is_empty() {
                warn!(
                    repositories = self.repositories.len(),
                    "No commits found in configured repositories"
                );
            }
            Ok(FetchResult::Commits(commits))
        })
        .await
    }

    fn metadata(&self) -> PluginMetadata {
        let mut config = BTreeMap::new();
        config.insert("repositories".to_string(), self.repositories.join(", "));
        config.insert(
            "author".to_string(),
            self.author.get().cloned().unwrap_or_default(),
        );
        self.info.metadata(config)
    }

    fn fetch_class(&self) -> FetchClass {
        FetchClass::Local
    }
}
