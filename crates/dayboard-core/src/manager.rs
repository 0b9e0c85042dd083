//! Owns the registry, scheduler, widget board and dispatcher for one process.

use crate::dispatcher::{Dispatcher, DispatcherHandle, TaskRun};
use crate::plugin::{
    Plugin, PluginHandle, PluginMetadata, PluginRegistry, RegistryError, SharedPlugin,
};
use crate::scheduler::{Task, TaskScheduler};
use crate::widget::{WidgetBoard, WidgetState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Summary of a shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownReport {
    pub plugins: usize,
    pub failed_teardowns: usize,
}

pub struct PluginManager {
    registry: Arc<Mutex<PluginRegistry>>,
    scheduler: Arc<Mutex<TaskScheduler>>,
    board: Arc<WidgetBoard>,
    dispatcher: Dispatcher,
    running: Option<DispatcherHandle>,
}

impl PluginManager {
    pub fn new(board: WidgetBoard) -> Self {
        Self::with_cancel(board, CancellationToken::new())
    }

    /// `cancel` stops the tick loop and every in-flight fetch
    pub fn with_cancel(board: WidgetBoard, cancel: CancellationToken) -> Self {
        let scheduler = Arc::new(Mutex::new(TaskScheduler::new()));
        let board = Arc::new(board);
        let dispatcher = Dispatcher::new(scheduler.clone(), board.clone()).with_cancel(cancel);
        Self {
            registry: Arc::new(Mutex::new(PluginRegistry::new())),
            scheduler,
            board,
            dispatcher,
            running: None,
        }
    }

    fn lock_registry(&self) -> MutexGuard<'_, PluginRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_scheduler(&self) -> MutexGuard<'_, TaskScheduler> {
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Registration ─────────────────────────────────────────────────────────

    pub fn register(&self, plugin: SharedPlugin) -> Result<(), RegistryError> {
        self.lock_registry().register(plugin)
    }

    /// Configure `plugin`, wrap it and register it.
    ///
    /// A rejected configuration does not fail registration; the plugin is
    /// kept inactive so its widget can say why.
    pub fn register_configured<P: Plugin + 'static>(
        &self,
        plugin: P,
        options: &toml::Table,
    ) -> Result<SharedPlugin, RegistryError> {
        let handle = Arc::new(PluginHandle::configured(plugin, options));
        self.register(handle.clone())?;
        Ok(handle)
    }

    pub fn unregister(&self, identity: &str) -> Result<SharedPlugin, RegistryError> {
        self.lock_registry().unregister(identity)
    }

    pub fn lookup(&self, identity: &str) -> Option<SharedPlugin> {
        self.lock_registry().lookup(identity)
    }

    pub fn list_metadata(&self) -> Vec<PluginMetadata> {
        self.lock_registry().list_metadata()
    }

    // ── Scheduling ───────────────────────────────────────────────────────────

    /// Schedule task `name` feeding `widget` every `interval`, bound to the
    /// registered plugin `identity` (or to nothing).
    pub fn schedule(
        &self,
        name: &str,
        widget: &str,
        interval: Duration,
        identity: Option<&str>,
    ) -> Result<(), RegistryError> {
        let plugin = match identity {
            Some(id) => Some(
                self.lookup(id)
                    .ok_or_else(|| RegistryError::NotFound(id.to_string()))?,
            ),
            None => None,
        };
        if !self.board.contains(widget) {
            warn!(task = name, widget, "Task feeds a widget that is not on the board");
        }
        debug!(task = name, widget, ?interval, plugin = ?identity, "Scheduled task");
        self.lock_scheduler()
            .add(Task::new(name, interval, plugin, Instant::now()).with_widget(widget));
        Ok(())
    }

    pub fn unschedule(&self, name: &str) {
        self.lock_scheduler().remove_task(name);
    }

    pub fn task_names(&self) -> Vec<String> {
        self.lock_scheduler().names()
    }

    // ── Running ──────────────────────────────────────────────────────────────

    /// Start the tick loop. No-op if it is already running.
    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }
        info!(
            plugins = self.lock_registry().len(),
            tasks = self.lock_scheduler().len(),
            "Starting dashboard dispatcher"
        );
        self.running = Some(self.dispatcher.start());
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn run_now(&self, task: &str) -> Option<TaskRun> {
        self.dispatcher.run_now(task)
    }

    pub fn refresh_all(&self) -> Vec<TaskRun> {
        self.dispatcher.refresh_all()
    }

    /// Set the active tag on every taggable plugin in `category`.
    /// Returns the identities that were updated.
    pub fn set_category_tag(&self, category: &str, tag: &str) -> Vec<String> {
        let plugins = self.lock_registry().taggable_in(category);
        plugins
            .iter()
            .filter_map(|p| {
                p.as_taggable().map(|t| {
                    t.set_current_tag(tag);
                    p.identity().to_string()
                })
            })
            .collect()
    }

    /// Push the configured tag list to every taggable plugin in `category`
    pub fn set_category_tags(&self, category: &str, tags: &[String]) {
        for plugin in self.lock_registry().taggable_in(category) {
            if let Some(taggable) = plugin.as_taggable() {
                taggable.set_tags(tags.to_vec());
            }
        }
    }

    // ── Read side ────────────────────────────────────────────────────────────

    pub fn board(&self) -> &Arc<WidgetBoard> {
        &self.board
    }

    pub fn snapshot(&self) -> Vec<WidgetState> {
        self.board.snapshot()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // ── Shutdown ─────────────────────────────────────────────────────────────

    /// Stop the tick loop, cancel in-flight fetches, then tear every plugin down.
    pub async fn shutdown(&mut self) -> ShutdownReport {
        if let Some(handle) = self.running.take() {
            handle.stop().await;
        }
        let registry = self.lock_registry();
        let report = ShutdownReport {
            plugins: registry.len(),
            failed_teardowns: registry.teardown_all(),
        };
        info!(
            "Shutdown complete: {} plugin(s), {} teardown failure(s)",
            report.plugins, report.failed_teardowns
        );
        report
    }
}
