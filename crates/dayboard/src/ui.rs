//! Ratatui layout for the dashboard.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ dayboard  Good morning, Ada       Mon 21 Oct 09:14   ☀ 24°C Pune │ header
//! ├────────────────────┬────────────────────┬────────────────────────┤
//! │ JIRA (4)           │ PRs (2)            │ Builds (1) ❌          │
//! │ ...                │ ...                │ ...                    │ grid
//! ├────────────────────┴────────────────────┴────────────────────────┤
//! │ → https://github.com/o/r/pull/42                                 │ link
//! │ q: quit  Tab: widget  ↑↓: select  t: tag  r: refresh  ⏎: open   │ legend
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Timelike;
use dayboard_core::widget::WidgetState;
use dayboard_plugins::catalog::NEWS_WIDGET;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
};

use crate::app::App;

pub const COLUMNS: usize = 3;

pub fn draw(frame: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(0),    // grid
            Constraint::Length(1), // link
            Constraint::Length(1), // legend
        ])
        .split(frame.area());

    draw_header(frame, outer[0], app);
    draw_grid(frame, outer[1], app);
    draw_link(frame, outer[2], app);
    draw_legend(frame, outer[3], app);
}

/// Time-of-day greeting for `hour` in 0..24
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}

/// "☀ 24°C Bengaluru" from the weather widget's first row
pub fn weather_pill(weather: Option<&WidgetState>) -> String {
    let Some(item) = weather.and_then(|w| w.items.first()) else {
        return "weather unavailable".to_string();
    };
    match item.subtitle.rsplit_once(" • ") {
        Some((_, place)) => format!("{} {}", item.title, place),
        None => item.title.clone(),
    }
}

// ── Header ────────────────────────────────────────────────────────────────────

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(48)])
        .split(area);

    let left = Line::from(vec![
        Span::styled(
            " dayboard ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {}, {}", greeting(app.now.hour()), app.user)),
    ]);
    frame.render_widget(Paragraph::new(left), halves[0]);

    let right = Line::from(vec![
        Span::styled(
            app.now.format("%a %d %b %H:%M").to_string(),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", weather_pill(app.weather.as_ref())),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
    ])
    .alignment(Alignment::Right);
    frame.render_widget(Paragraph::new(right), halves[1]);
}

// ── Grid ──────────────────────────────────────────────────────────────────────

fn draw_grid(frame: &mut Frame, area: Rect, app: &App) {
    if app.widgets.is_empty() {
        return;
    }
    let rows = app.widgets.len().div_ceil(COLUMNS);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    for (row, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, COLUMNS as u32); COLUMNS])
            .split(*row_area);
        for (col, cell) in cells.iter().enumerate() {
            let idx = row * COLUMNS + col;
            if let Some(widget) = app.widgets.get(idx) {
                draw_widget(frame, *cell, app, widget, idx == app.focus);
            }
        }
    }
}

fn widget_title(app: &App, widget: &WidgetState) -> String {
    if widget.key == NEWS_WIDGET {
        format!(" {} • {} ", widget.heading(), app.tags.current())
    } else {
        format!(" {} ", widget.heading())
    }
}

fn draw_widget(frame: &mut Frame, area: Rect, app: &App, widget: &WidgetState, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else if widget.has_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(widget_title(app, widget))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style);

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = widget
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if focused && i == app.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let mut spans = Vec::new();
            if !item.status.is_empty() {
                spans.push(Span::raw(format!("{} ", item.status)));
            }
            spans.push(Span::styled(truncate_str(&item.title, width), style));
            let mut lines = vec![Line::from(spans)];
            if !item.subtitle.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {}", truncate_str(&item.subtitle, width.saturating_sub(2))),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

// ── Footer ────────────────────────────────────────────────────────────────────

fn draw_link(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.selected_link() {
        Some(link) => Line::from(vec![
            Span::styled(" → ", Style::default().fg(Color::Cyan)),
            Span::styled(link, Style::default().add_modifier(Modifier::UNDERLINED)),
        ]),
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_legend(frame: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| {
        Span::styled(k, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    };
    let line = if let Some(ref msg) = app.status_message {
        Line::from(vec![
            Span::styled(" ✓ ", Style::default().fg(Color::Green)),
            Span::raw(msg.as_str()),
        ])
    } else {
        Line::from(vec![
            key(" q"),
            Span::raw(": quit  "),
            key("Tab"),
            Span::raw(": widget  "),
            key("↑↓"),
            Span::raw(": select  "),
            key("t"),
            Span::raw(": tag  "),
            key("T"),
            Span::raw(": all  "),
            key("r"),
            Span::raw(": refresh  "),
            key("⏎"),
            Span::raw(": open"),
        ])
    };
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
        area,
    );
}

/// Truncate to `max_chars` characters, ending in `…` when cut
fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}
