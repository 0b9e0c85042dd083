//! dayboard: a terminal dashboard of the day's weather, news, commits,
//! pull requests and commute.
//!
//! # Usage
//!
//! ```text
//! dayboard                 # run the dashboard
//! dayboard config          # show where the config file lives
//! dayboard config --init   # write a starter config
//! ```
//!
//! # Architecture
//!
//! Plugins and refresh tasks are assembled from the config by
//! [`dayboard_plugins::catalog`] and run by the core dispatcher on its own
//! one-second tick. The UI loop here redraws every 100 ms from a snapshot
//! of the widget board, polls input without blocking, and forwards key
//! actions (tag change, refresh, open link) to the manager.

mod app;
mod browser;
mod events;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use dayboard_core::{
    config::{CONFIG_FILE, DashboardConfig, config_path, load_config_from, write_default_config},
    home::config_dir,
    dispatcher::TaskRun,
    logging,
    manager::PluginManager,
};
use dayboard_plugins::catalog::{self, NEWS_CATEGORY, NEWS_WIDGET};

use app::{App, PendingAction};

const FRAME: Duration = Duration::from_millis(100);
const LOG_FILE: &str = "dayboard.log";

// ── CLI ───────────────────────────────────────────────────────────────────────

/// Terminal dashboard for the start of the day.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Read configuration from this file instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the configuration file path and whether it exists.
    Config {
        /// Write a starter configuration if none exists.
        #[arg(long)]
        init: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = match cli.config {
        Some(path) => path,
        None => config_path()?,
    };

    match cli.command {
        Some(Command::Config { init }) => {
            logging::init(None);
            print_config_status(&path, init)
        }
        None => {
            let log = config_dir().map(|dir| dir.join(LOG_FILE)).ok();
            logging::init(log.as_deref());
            run(load_config_from(&path)).await
        }
    }
}

fn print_config_status(path: &Path, init: bool) -> Result<()> {
    if init {
        if write_default_config(path)? {
            println!("Wrote {}", path.display());
        } else {
            println!("{} already exists, left unchanged", path.display());
        }
        return Ok(());
    }
    let state = if path.exists() { "exists" } else { "missing" };
    println!("{} ({state})", path.display());
    if !path.exists() {
        println!("Run `dayboard config --init` to create {CONFIG_FILE}.");
    }
    Ok(())
}

async fn run(config: DashboardConfig) -> Result<()> {
    let cancel = CancellationToken::new();
    let mut manager = catalog::build_manager(&config, cancel.clone())
        .context("assemble dashboard plugins")?;
    start_dashboard(&mut manager);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")?;

    let mut app = App::new(config.user.name.clone(), config.news_tags());
    let result = run_app(&mut terminal, &mut app, &manager).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    cancel.cancel();
    let report = manager.shutdown().await;
    info!(
        plugins = report.plugins,
        failed_teardowns = report.failed_teardowns,
        "Dashboard stopped"
    );

    if let Err(ref e) = result {
        eprintln!("dayboard error: {e:#}");
    }
    result
}

/// Start the tick loop and fetch every widget once, out of band, so the
/// board fills in without waiting a full interval.
fn start_dashboard(manager: &mut PluginManager) -> Vec<TaskRun> {
    manager.start();
    let runs = manager.refresh_all();
    info!(tasks = runs.len(), "Initial fetch started");
    runs
}

// ── UI loop ───────────────────────────────────────────────────────────────────

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    manager: &PluginManager,
) -> Result<()> {
    let mut tick = interval(FRAME);

    loop {
        app.update(manager.snapshot(), Local::now());
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::ZERO)? {
            let ev = event::read()?;
            if events::handle_event(&ev, app) {
                break;
            }
        }

        if let Some(action) = app.pending.take() {
            dispatch(action, app, manager);
        }

        tick.tick().await;
    }
    Ok(())
}

/// Carry out a key action against the manager
fn dispatch(action: PendingAction, app: &mut App, manager: &PluginManager) {
    match action {
        PendingAction::ApplyTag(tag) => {
            let updated = manager.set_category_tag(NEWS_CATEGORY, &tag);
            info!(tag = %tag, sources = updated.len(), "News tag changed");
            if manager.run_now(NEWS_WIDGET).is_none() {
                warn!("No news task to refresh");
            }
        }
        PendingAction::RefreshAll => {
            let started = manager.refresh_all().len();
            info!(tasks = started, "Manual refresh");
        }
        PendingAction::OpenLink(url) => {
            if let Err(e) = browser::open(&url) {
                warn!("Could not open {url}: {e:#}");
                app.status_message = Some(format!("Could not open link: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_config_subcommand() {
        let cli = Cli::try_parse_from(["dayboard", "config", "--init"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Config { init: true })));

        let cli = Cli::try_parse_from(["dayboard", "--config", "/tmp/d.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/d.toml")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_print_config_status_init_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        print_config_status(&path, true).unwrap();
        assert!(path.exists());
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, "[user]\nname = 'kept'\n").unwrap();
        print_config_status(&path, true).unwrap();
        assert_ne!(std::fs::read_to_string(&path).unwrap(), written);
        print_config_status(&path, false).unwrap();
    }

    #[tokio::test]
    async fn test_start_dashboard_fetches_every_widget_immediately() {
        let config = DashboardConfig::default();
        let cancel = CancellationToken::new();
        let mut manager = catalog::build_manager(&config, cancel.clone()).unwrap();
        assert_eq!(manager.board().get("jira").unwrap().items[0].title, "Loading...");

        let runs = start_dashboard(&mut manager);
        assert!(manager.is_running());
        assert_eq!(runs.len(), catalog::WIDGETS.len());

        let mut local = Vec::new();
        for (name, handle) in runs {
            if name == "jira" || name == catalog::WEATHER_WIDGET {
                local.push(handle);
            } else {
                handle.abort();
            }
        }
        for handle in local {
            handle.await.unwrap();
        }
        cancel.cancel();

        let jira = manager.board().get("jira").unwrap();
        assert_ne!(jira.items[0].title, "Loading...");
        assert!(!jira.has_error);
        // Weather has no api_key, so its first fetch reports that at once
        let weather = manager.board().get(catalog::WEATHER_WIDGET).unwrap();
        assert!(weather.has_error);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_dispatch_tag_change_reaches_news_sources() {
        let config = DashboardConfig::default();
        let cancel = CancellationToken::new();
        let manager = catalog::build_manager(&config, cancel.clone()).unwrap();
        let mut app = App::new("Ada", config.news_tags());

        app.cycle_tag();
        let action = app.pending.take().unwrap();
        // Cancel the spawned news run before it reaches the network
        dispatch(action, &mut app, &manager);
        cancel.cancel();

        let hn = manager.lookup("hackernews").unwrap();
        assert_eq!(hn.as_taggable().unwrap().current_tag(), "golang");
    }
}
