//! Keyboard handling for the dashboard.
//!
//! | Key | Action |
//! |-----|--------|
//! | `q` / `Ctrl-C` | Quit |
//! | `Tab` / `Shift-Tab` | Next / previous widget |
//! | `↑` `↓` / `k` `j` | Select row |
//! | `t` | Cycle the news tag |
//! | `T` | Reset the news tag to All |
//! | `r` / `R` | Refresh every widget |
//! | `Enter` | Open the selected row's link |

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Apply one terminal event to `app`. Returns `true` when the app should quit.
pub fn handle_event(event: &Event, app: &mut App) -> bool {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind,
        ..
    }) = event
    else {
        return false;
    };
    if *kind == KeyEventKind::Release {
        return false;
    }

    match (code, modifiers) {
        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => app.should_quit = true,
        (KeyCode::Char('q'), _) => app.should_quit = true,
        (KeyCode::BackTab, _) => app.focus_previous(),
        (KeyCode::Tab, m) if m.contains(KeyModifiers::SHIFT) => app.focus_previous(),
        (KeyCode::Tab, _) => app.focus_next(),
        (KeyCode::Up | KeyCode::Char('k'), _) => app.select_previous(),
        (KeyCode::Down | KeyCode::Char('j'), _) => app.select_next(),
        (KeyCode::Char('t'), _) => app.cycle_tag(),
        (KeyCode::Char('T'), _) => app.reset_tag(),
        (KeyCode::Char('r' | 'R'), _) => app.request_refresh(),
        (KeyCode::Enter, _) => app.open_selected(),
        _ => {}
    }
    app.should_quit
}
