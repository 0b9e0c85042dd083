//! Drives scheduled tasks against their plugins.
//!
//! Each tick, every due task is marked ran under the scheduler lock and only
//! then spawned, so a slow fetch can never be picked up twice. Every fetch
//! runs in its own task with a deadline; errors, timeouts and panics stop at
//! that task and turn into a flagged widget showing its last-known-good rows.

use crate::plugin::{FetchContext, PluginError};
use crate::scheduler::{Task, TaskScheduler};
use crate::widget::WidgetBoard;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Tick cadence, independent of any task's interval
pub const TICK: Duration = Duration::from_secs(1);

/// How a single task execution ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Fetch succeeded and the widget was rebuilt
    Updated,
    /// Fetch returned an error
    Failed(String),
    /// Deadline passed before the fetch returned
    TimedOut,
    /// Fetch panicked
    Panicked,
    /// No plugin bound to the task
    Skipped,
}

/// A spawned execution of one task
pub type TaskRun = (String, JoinHandle<TaskOutcome>);

/// Bridges scheduler timing to plugin execution
#[derive(Clone)]
pub struct Dispatcher {
    scheduler: Arc<Mutex<TaskScheduler>>,
    board: Arc<WidgetBoard>,
    cancel: CancellationToken,
    tick: Duration,
}

impl Dispatcher {
    pub fn new(scheduler: Arc<Mutex<TaskScheduler>>, board: Arc<WidgetBoard>) -> Self {
        Self {
            scheduler,
            board,
            cancel: CancellationToken::new(),
            tick: TICK,
        }
    }

    /// Use `cancel` as the parent of every fetch context and as the loop's stop signal
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn scheduler(&self) -> &Arc<Mutex<TaskScheduler>> {
        &self.scheduler
    }

    pub fn board(&self) -> &Arc<WidgetBoard> {
        &self.board
    }

    fn lock_scheduler(&self) -> MutexGuard<'_, TaskScheduler> {
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Launch every task due at `now`. Each is marked ran before it is spawned.
    pub fn dispatch_due(&self, now: Instant) -> Vec<TaskRun> {
        let due = {
            let mut scheduler = self.lock_scheduler();
            let due = scheduler.due_tasks(now);
            for task in &due {
                scheduler.mark_ran_at(&task.name, now);
            }
            due
        };
        if !due.is_empty() {
            debug!(count = due.len(), "Dispatching due tasks");
        }
        due.into_iter().map(|task| self.spawn(task)).collect()
    }

    /// Fetch `name` out of band, leaving its schedule alone
    pub fn run_now(&self, name: &str) -> Option<TaskRun> {
        let task = self.lock_scheduler().get(name).cloned()?;
        Some(self.spawn(task))
    }

    /// Fetch every bound task out of band
    pub fn refresh_all(&self) -> Vec<TaskRun> {
        let tasks: Vec<Task> = self
            .lock_scheduler()
            .tasks()
            .iter()
            .filter(|t| t.plugin.is_some())
            .cloned()
            .collect();
        info!(count = tasks.len(), "Refreshing all widgets");
        tasks.into_iter().map(|task| self.spawn(task)).collect()
    }

    fn spawn(&self, task: Task) -> TaskRun {
        let name = task.name.clone();
        let board = self.board.clone();
        let cancel = self.cancel.child_token();
        (name, tokio::spawn(execute(task, board, cancel)))
    }

    /// Spawn the tick loop. It runs until the dispatcher's token is cancelled.
    pub fn start(&self) -> DispatcherHandle {
        let dispatcher = self.clone();
        let cancel = self.cancel.clone();
        let join = tokio::spawn(async move {
            info!("Starting dispatcher (tick: {:?})", dispatcher.tick);
            let mut ticker = tokio::time::interval(dispatcher.tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // Runs are detached; each logs its own outcome.
                        dispatcher.dispatch_due(Instant::now());
                    }
                    _ = dispatcher.cancel.cancelled() => {
                        info!("Dispatcher cancelled");
                        break;
                    }
                }
            }
        });
        DispatcherHandle { cancel, join }
    }
}

/// Running tick loop
pub struct DispatcherHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl DispatcherHandle {
    /// Cancel the loop and every in-flight fetch, then wait for the loop to exit
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            warn!("Dispatcher loop ended abnormally: {e}");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Run one task to completion and fold the result into its widget.
///
/// The fetch itself runs in a nested task so a panic surfaces here as a
/// `JoinError` instead of unwinding through the caller.
async fn execute(task: Task, board: Arc<WidgetBoard>, cancel: CancellationToken) -> TaskOutcome {
    let Some(plugin) = task.plugin else {
        debug!(task = %task.name, "No plugin bound, skipping");
        return TaskOutcome::Skipped;
    };

    let ctx = FetchContext::new(cancel, task.timeout);
    let deadline = ctx.deadline();
    let mut fetch = {
        let plugin = plugin.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move { plugin.fetch(ctx).await })
    };

    let outcome = match tokio::time::timeout_at(deadline, &mut fetch).await {
        Ok(Ok(Ok(result))) => {
            plugin.record_success(&result);
            board.apply_success(&task.widget, &result);
            debug!(
                task = %task.name,
                plugin = plugin.identity(),
                kind = result.kind(),
                count = result.len(),
                "Fetch succeeded"
            );
            return TaskOutcome::Updated;
        }
        Ok(Ok(Err(PluginError::Timeout { .. }))) => TaskOutcome::TimedOut,
        Ok(Ok(Err(e))) => TaskOutcome::Failed(e.to_string()),
        Ok(Err(join)) if join.is_panic() => TaskOutcome::Panicked,
        Ok(Err(join)) => TaskOutcome::Failed(join.to_string()),
        Err(_) => {
            ctx.cancel();
            fetch.abort();
            TaskOutcome::TimedOut
        }
    };

    warn!(
        task = %task.name,
        plugin = plugin.identity(),
        "Fetch did not complete: {outcome:?}"
    );
    board.apply_failure(&task.widget, plugin.last_good().as_ref());
    outcome
}
