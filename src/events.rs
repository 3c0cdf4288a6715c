use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Connections),
        KeyCode::Char('2') => app.set_view(View::Trends),
        KeyCode::Char('3') => app.set_view(View::Globe),

        // Left/right rotate the globe, switch views elsewhere
        KeyCode::Left | KeyCode::Char('h') => {
            if app.current_view == View::Globe {
                app.rotate_globe(-1);
            } else {
                app.prev_view();
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if app.current_view == View::Globe {
                app.rotate_globe(1);
            } else {
                app.next_view();
            }
        }

        // Selection
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Filters
        KeyCode::Char('p') => app.cycle_provider_cursor(),
        KeyCode::Char(' ') => app.toggle_cursor_provider(),
        KeyCode::Char('x') => app.toggle_selected_exchange(),
        KeyCode::Char('c') => app.toggle_connections(),
        KeyCode::Char('0') => app.reset_filters(),

        KeyCode::Char('t') => app.cycle_time_range(),
        KeyCode::Char('r') => app.refresh_now(),
        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('e') => {
            let export_path = app.export_path.clone();
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Rows start after the table border and header
            if clicked_row > content_start_row + 1 {
                let item_row = (clicked_row - content_start_row - 2) as usize;
                match app.current_view {
                    View::Connections => {
                        if item_row < app.topology().exchanges().len() {
                            app.selected_exchange_index = item_row;
                        }
                    }
                    View::Trends => {
                        if item_row < app.pairs().len() {
                            app.selected_pair_index = item_row;
                        }
                    }
                    View::Globe => {}
                }
            }

            // Tab bar: " 1:Connections " | " 2:Trends " | " 3:Globe "
            if clicked_row == 1 {
                let col = mouse.column;
                if col < 16 {
                    app.set_view(View::Connections);
                } else if col < 28 {
                    app.set_view(View::Trends);
                } else if col < 38 {
                    app.set_view(View::Globe);
                }
            }
        }

        _ => {}
    }
}
