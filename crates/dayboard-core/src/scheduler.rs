//! Timing bookkeeping for periodic tasks.
//!
//! The scheduler performs no I/O and never sees a fetch result. It answers
//! "what is due" and records "this ran"; the dispatcher does the rest.

use crate::plugin::{FetchClass, SharedPlugin};
use std::time::Duration;
use tokio::time::Instant;

/// Wake-up horizon reported when nothing is scheduled
pub const IDLE_WAKE: Duration = Duration::from_secs(60 * 60);
/// Longest interval honoured; larger ones run this often instead
pub const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

fn next_after(now: Instant, interval: Duration) -> Instant {
    now + interval.min(MAX_INTERVAL)
}

/// A named, interval-bound schedule slot
#[derive(Debug, Clone)]
pub struct Task {
    pub name: String,
    pub interval: Duration,
    pub last_run: Option<Instant>,
    pub next_run: Instant,
    /// Bound plugin; the task does not own its lifecycle
    pub plugin: Option<SharedPlugin>,
    /// Widget the results feed, defaults to the task name
    pub widget: String,
    /// Fetch deadline, from the plugin's I/O class
    pub timeout: Duration,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        interval: Duration,
        plugin: Option<SharedPlugin>,
        now: Instant,
    ) -> Self {
        let name = name.into();
        let timeout = plugin
            .as_ref()
            .map(|p| p.fetch_class())
            .unwrap_or_default()
            .timeout();
        Self {
            widget: name.clone(),
            name,
            interval,
            last_run: None,
            next_run: next_after(now, interval),
            plugin,
            timeout,
        }
    }

    pub fn with_widget(mut self, widget: impl Into<String>) -> Self {
        self.widget = widget.into();
        self
    }

    pub fn with_fetch_class(mut self, class: FetchClass) -> Self {
        self.timeout = class.timeout();
        self
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_run <= now
    }
}

/// Insertion-ordered set of tasks keyed by name
#[derive(Debug, Default)]
pub struct TaskScheduler {
    tasks: Vec<Task>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `name` to first run one `interval` from now.
    /// Replaces any task with the same name.
    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        interval: Duration,
        plugin: Option<SharedPlugin>,
    ) {
        self.add(Task::new(name, interval, plugin, Instant::now()));
    }

    /// Insert a prepared task. A replaced task keeps its position.
    pub fn add(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.name == task.name) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// No-op if absent
    pub fn remove_task(&mut self, name: &str) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.name == name)?;
        Some(self.tasks.remove(pos))
    }

    /// Task with the earliest next run; ties go to the earliest inserted.
    pub fn next_due(&self) -> Option<&Task> {
        // min_by_key keeps the first of equal minima
        self.tasks.iter().min_by_key(|t| t.next_run)
    }

    pub fn mark_ran(&mut self, name: &str) {
        self.mark_ran_at(name, Instant::now());
    }

    /// Set `last_run = now` and `next_run = now + interval`
    pub fn mark_ran_at(&mut self, name: &str, now: Instant) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.name == name) {
            task.last_run = Some(now);
            task.next_run = next_after(now, task.interval);
        }
    }

    pub fn next_wake_time(&self) -> Instant {
        self.next_due()
            .map(|t| t.next_run)
            .unwrap_or_else(|| Instant::now() + IDLE_WAKE)
    }

    /// Tasks due at `now`, in insertion order
    pub fn due_tasks(&self, now: Instant) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.is_due(now))
            .cloned()
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.name.clone()).collect()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_due_picks_minimum() {
        let mut s = TaskScheduler::new();
        s.add_task("weather", secs(600), None);
        s.add_task("news", secs(5), None);
        s.add_task("traffic", secs(300), None);

        assert_eq!(s.next_due().unwrap().name, "news");
        assert_eq!(s.next_wake_time(), Instant::now() + secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_due_tie_breaks_by_insertion() {
        let mut s = TaskScheduler::new();
        s.add_task("b", secs(10), None);
        s.add_task("a", secs(10), None);
        s.add_task("c", secs(10), None);
        assert_eq!(s.next_due().unwrap().name, "b");

        s.mark_ran("b");
        assert_eq!(s.next_due().unwrap().name, "a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_task_replaces_existing() {
        let mut s = TaskScheduler::new();
        s.add_task("news", secs(5), None);
        s.add_task("weather", secs(600), None);
        s.add_task("news", secs(60), None);

        assert_eq!(s.len(), 2);
        assert_eq!(s.get("news").unwrap().interval, secs(60));
        assert_eq!(s.names(), vec!["news", "weather"]);
        assert_eq!(s.get("news").unwrap().next_run, Instant::now() + secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_ran_sets_timestamps() {
        let mut s = TaskScheduler::new();
        s.add_task("news", secs(5), None);
        tokio::time::advance(secs(7)).await;

        let before = Instant::now();
        s.mark_ran("news");
        let task = s.get("news").unwrap();
        assert_eq!(task.last_run, Some(before));
        assert_eq!(task.next_run, before + secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_is_capped() {
        let mut s = TaskScheduler::new();
        s.add_task("weather", Duration::MAX, None);
        let now = Instant::now();
        assert_eq!(s.get("weather").unwrap().next_run, now + MAX_INTERVAL);

        s.mark_ran("weather");
        assert_eq!(s.get("weather").unwrap().next_run, now + MAX_INTERVAL);
        assert_eq!(s.next_wake_time(), now + MAX_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_task_is_noop_when_absent() {
        let mut s = TaskScheduler::new();
        s.add_task("news", secs(5), None);
        assert!(s.remove_task("weather").is_none());
        assert!(s.remove_task("news").is_some());
        assert!(s.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_scheduler_wakes_in_an_hour() {
        let s = TaskScheduler::new();
        assert!(s.next_due().is_none());
        assert_eq!(s.next_wake_time(), Instant::now() + IDLE_WAKE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_due_tasks_in_insertion_order() {
        let mut s = TaskScheduler::new();
        s.add_task("weather", secs(600), None);
        s.add_task("news", secs(5), None);
        s.add_task("commits", secs(5), None);

        let now = Instant::now() + secs(5);
        let due: Vec<_> = s.due_tasks(now).into_iter().map(|t| t.name).collect();
        assert_eq!(due, vec!["news", "commits"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_widget_defaults_to_name() {
        let task = Task::new("news", secs(5), None, Instant::now());
        assert_eq!(task.widget, "news");
        assert_eq!(task.timeout, FetchClass::NETWORK_TIMEOUT);
        let task = task.with_widget("feed").with_fetch_class(FetchClass::Local);
        assert_eq!(task.widget, "feed");
        assert_eq!(task.timeout, FetchClass::LOCAL_TIMEOUT);
    }
}
