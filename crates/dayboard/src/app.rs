//! Application state for the dashboard TUI.
//!
//! [`App`] holds what the renderer needs: the latest widget snapshot, focus,
//! selection and the news tag cycle. Key handling mutates it; the main loop
//! turns [`PendingAction`]s into calls on the plugin manager. No I/O here.

use chrono::{DateTime, Local};
use dayboard_core::tags::TagCycle;
use dayboard_core::widget::{DisplayItem, WidgetState};
use dayboard_plugins::catalog::{NEWS_WIDGET, WEATHER_WIDGET, grid_keys};

/// Work for the main loop, set by the key handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Set this tag on every news source and refresh the news widget
    ApplyTag(String),
    /// Run every task now
    RefreshAll,
    /// Open a link in the system browser
    OpenLink(String),
}

pub struct App {
    /// Name used in the header greeting
    pub user: String,
    /// Grid widgets in reading order
    pub widgets: Vec<WidgetState>,
    /// Header pill, absent until the board has a weather slot
    pub weather: Option<WidgetState>,
    /// Index into [`widgets`](Self::widgets) of the focused widget
    pub focus: usize,
    /// Selected row within the focused widget
    pub selected: usize,
    pub tags: TagCycle,
    pub now: DateTime<Local>,
    pub should_quit: bool,
    pub pending: Option<PendingAction>,
    /// Shown in the legend bar until the next action replaces it
    pub status_message: Option<String>,
}

impl App {
    pub fn new(user: impl Into<String>, news_tags: Vec<String>) -> Self {
        Self {
            user: user.into(),
            widgets: Vec::new(),
            weather: None,
            focus: 0,
            selected: 0,
            tags: TagCycle::new(news_tags),
            now: Local::now(),
            should_quit: false,
            pending: None,
            status_message: None,
        }
    }

    /// Replace widget state with a fresh board snapshot, keeping focus and
    /// clamping the selection.
    pub fn update(&mut self, snapshot: Vec<WidgetState>, now: DateTime<Local>) {
        self.now = now;
        let mut grid = Vec::with_capacity(snapshot.len());
        for key in grid_keys() {
            if let Some(state) = snapshot.iter().find(|w| w.key == key) {
                grid.push(state.clone());
            }
        }
        self.weather = snapshot.into_iter().find(|w| w.key == WEATHER_WIDGET);
        self.widgets = grid;

        if self.focus >= self.widgets.len() {
            self.focus = 0;
        }
        let rows = self.focused().map_or(0, |w| w.items.len());
        if self.selected >= rows {
            self.selected = rows.saturating_sub(1);
        }
    }

    pub fn focused(&self) -> Option<&WidgetState> {
        self.widgets.get(self.focus)
    }

    pub fn selected_item(&self) -> Option<&DisplayItem> {
        self.focused().and_then(|w| w.items.get(self.selected))
    }

    pub fn selected_link(&self) -> Option<&str> {
        self.selected_item().and_then(|i| i.link.as_deref())
    }

    pub fn focus_next(&mut self) {
        if self.widgets.is_empty() {
            return;
        }
        self.focus = (self.focus + 1) % self.widgets.len();
        self.selected = 0;
    }

    pub fn focus_previous(&mut self) {
        if self.widgets.is_empty() {
            return;
        }
        self.focus = self.focus.checked_sub(1).unwrap_or(self.widgets.len() - 1);
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        let rows = self.focused().map_or(0, |w| w.items.len());
        if rows > 0 {
            self.selected = (self.selected + 1) % rows;
        }
    }

    pub fn select_previous(&mut self) {
        let rows = self.focused().map_or(0, |w| w.items.len());
        if rows > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(rows - 1);
        }
    }

    /// Move to the next news tag and queue it for the sources
    pub fn cycle_tag(&mut self) {
        self.tags.advance();
        self.queue_tag();
    }

    pub fn reset_tag(&mut self) {
        self.tags.reset();
        self.queue_tag();
    }

    fn queue_tag(&mut self) {
        self.status_message = Some(format!("News: {}", self.tags.current()));
        self.pending = Some(PendingAction::ApplyTag(self.tags.current_filter()));
        if let Some(idx) = self.widgets.iter().position(|w| w.key == NEWS_WIDGET)
            && idx == self.focus
        {
            self.selected = 0;
        }
    }

    pub fn request_refresh(&mut self) {
        self.status_message = Some("Refreshing all widgets".to_string());
        self.pending = Some(PendingAction::RefreshAll);
    }

    /// Queue the selected row's link, if it has one
    pub fn open_selected(&mut self) {
        match self.selected_link().map(str::to_string) {
            Some(link) => self.pending = Some(PendingAction::OpenLink(link)),
            None => self.status_message = Some("No link for this item".to_string()),
        }
    }
}
