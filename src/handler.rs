use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{Action, App, Focus};
use crate::effect::Effect;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Apply one event to the app. Returns the request the runner should start, if any.
pub fn handle_event(app: &mut App, event: AppEvent) -> Option<Effect> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => None,
        AppEvent::Tick => {
            app.tick_animation();
            None
        }
        AppEvent::SuggestionLoaded(seq, result) => {
            app.apply_suggestion(seq, result);
            None
        }
        AppEvent::ActionSettled(action, result) => app.settle(action, result),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> Option<Effect> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return None;
    }

    // The alert blocks everything until dismissed
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return None;
    }

    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return app.activate(Action::UpdateSchedule);
    }

    match key.code {
        KeyCode::PageDown => {
            app.scroll_result_page_down();
            return None;
        }
        KeyCode::PageUp => {
            app.scroll_result_page_up();
            return None;
        }
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return None;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return None;
        }
        _ => {}
    }

    match app.focus {
        Focus::PlanInput => {
            handle_plan_editing(app, key);
            None
        }
        Focus::ClockOut => handle_button_keys(app, key, Action::ClockOut),
        Focus::Submit => handle_button_keys(app, key, Action::UpdateSchedule),
    }
}

fn handle_button_keys(app: &mut App, key: KeyEvent, focused: Action) -> Option<Effect> {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => app.activate(focused),
        KeyCode::Char('c') => app.activate(Action::ClockOut),
        KeyCode::Char('r') => Some(app.request_suggestion()),
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_result_down();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_result_up();
            None
        }
        KeyCode::Char('i') | KeyCode::Char('p') => {
            app.focus = Focus::PlanInput;
            None
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
            None
        }
        _ => None,
    }
}

fn handle_plan_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.focus = Focus::Submit;
        }
        KeyCode::Enter => {
            let byte_pos = char_to_byte_index(&app.plan_input, app.plan_cursor);
            app.plan_input.insert(byte_pos, '\n');
            app.plan_cursor += 1;
        }
        KeyCode::Backspace => {
            if app.plan_cursor > 0 {
                app.plan_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.plan_input, app.plan_cursor);
                app.plan_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.plan_input.chars().count();
            if app.plan_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.plan_input, app.plan_cursor);
                app.plan_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.plan_cursor = app.plan_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.plan_input.chars().count();
            app.plan_cursor = (app.plan_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.plan_cursor = 0;
        }
        KeyCode::End => {
            app.plan_cursor = app.plan_input.chars().count();
        }
        // Ctrl/Alt chords are not text
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            let byte_pos = char_to_byte_index(&app.plan_input, app.plan_cursor);
            app.plan_input.insert(byte_pos, c);
            app.plan_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) -> Option<Effect> {
    if app.alert.is_some() {
        return None;
    }

    let x = mouse.column;
    let y = mouse.row;
    let hit = |area: Option<Rect>| area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if hit(app.result_area) => {
            app.scroll_result_down();
            return None;
        }
        MouseEventKind::ScrollUp if hit(app.result_area) => {
            app.scroll_result_up();
            return None;
        }
        MouseEventKind::Down(MouseButton::Left) => {}
        _ => return None,
    }

    if hit(app.clock_out_area) {
        app.focus = Focus::ClockOut;
        app.activate(Action::ClockOut)
    } else if hit(app.submit_area) {
        app.focus = Focus::Submit;
        app.activate(Action::UpdateSchedule)
    } else if hit(app.plan_area) {
        app.focus = Focus::PlanInput;
        None
    } else {
        None
    }
}
