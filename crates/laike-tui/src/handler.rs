use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use laike_core::NavContext;
use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Cue { epoch, effect } => app.apply_cue(epoch, effect),
        AppEvent::Fragment { reply_id, text } => app.push_fragment(&reply_id, &text),
        AppEvent::StreamDone { reply_id } => app.finish_stream(&reply_id),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Popups take every key while open
    if app.field_editor.is_some() {
        handle_field_editor(app, key);
        return;
    }
    if app.show_api_key_input {
        handle_api_key_input(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn cycle_focus(app: &mut App, forward: bool) {
    app.focus = match (app.focus, forward) {
        (FocusPane::Sidebar, true) | (FocusPane::Input, false) => FocusPane::Transcript,
        (FocusPane::Transcript, true) | (FocusPane::Sidebar, false) => FocusPane::Input,
        (FocusPane::Input, true) | (FocusPane::Transcript, false) => FocusPane::Sidebar,
    };
    match app.focus {
        FocusPane::Input => app.input_mode = InputMode::Editing,
        FocusPane::Transcript => {
            app.input_mode = InputMode::Normal;
            if app.selected_control.is_none() {
                app.focus_latest_control();
            }
        }
        FocusPane::Sidebar => app.input_mode = InputMode::Normal,
    }
}

/// Digits 1-4 copy a suggestion chip into the composer (Normal mode only).
fn suggestion_digit(app: &App, key: KeyEvent) -> Option<usize> {
    match key.code {
        KeyCode::Char(c @ '1'..='4') if app.session.show_suggestions() => {
            Some(c as usize - '1' as usize)
        }
        _ => None,
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => cycle_focus(app, true),
        KeyCode::BackTab => cycle_focus(app, false),
        KeyCode::Char('K') => app.open_api_key_input(),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1) / 2),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1) / 2),
        _ => match app.focus {
            FocusPane::Sidebar => handle_sidebar(app, key),
            FocusPane::Transcript => handle_transcript(app, key),
            FocusPane::Input => handle_input_normal(app, key),
        },
    }
}

fn handle_sidebar(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::Right => {
            app.nav_enter();
        }
        _ => {}
    }
}

fn handle_transcript(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next_control(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev_control(),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_selected(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(app.chat_height.max(1) / 2);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(app.chat_height.max(1) / 2);
        }
        KeyCode::Char('g') => app.scroll_up(u16::MAX),
        KeyCode::Char('G') => {
            app.follow_bottom = true;
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.focus = FocusPane::Sidebar;
        }
        _ => {}
    }
}

fn handle_input_normal(app: &mut App, key: KeyEvent) {
    if let Some(index) = suggestion_digit(app, key) {
        app.pick_suggestion(index);
        return;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab => cycle_focus(app, true),
        KeyCode::BackTab => cycle_focus(app, false),
        KeyCode::Enter
            if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            insert_char(&mut app.input, &mut app.input_cursor, '\n');
        }
        KeyCode::Enter => app.submit_input(),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1) / 2),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1) / 2),
        _ => edit_line(&mut app.input, &mut app.input_cursor, key),
    }
}

fn handle_api_key_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_api_key_input(),
        KeyCode::Enter => app.save_api_key_input(),
        _ => edit_line(&mut app.api_key_input, &mut app.api_key_input_cursor, key),
    }
}

fn handle_field_editor(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_field_editor(),
        KeyCode::Enter => app.commit_field_editor(),
        _ => {
            if let Some(editor) = app.field_editor.as_mut() {
                edit_line(&mut editor.input, &mut editor.cursor, key);
            }
        }
    }
}

fn insert_char(text: &mut String, cursor: &mut usize, c: char) {
    let byte_pos = char_to_byte_index(text, *cursor);
    text.insert(byte_pos, c);
    *cursor += 1;
}

/// Cursor movement and character editing shared by every text box.
fn edit_line(text: &mut String, cursor: &mut usize, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if *cursor < text.chars().count() {
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            *cursor = (*cursor + 1).min(text.chars().count());
        }
        KeyCode::Home => {
            *cursor = 0;
        }
        KeyCode::End => {
            *cursor = text.chars().count();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            insert_char(text, cursor, c);
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_sidebar = app.sidebar_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_chat => app.scroll_down(3),
        MouseEventKind::ScrollUp if in_chat => app.scroll_up(3),
        MouseEventKind::Down(MouseButton::Left) if in_sidebar => {
            // One row per entry, inside the border
            if let Some(area) = app.sidebar_area {
                let row = y.saturating_sub(area.y + 1) as usize;
                if let Some(&context) = NavContext::all().get(row) {
                    app.focus = FocusPane::Sidebar;
                    app.input_mode = InputMode::Normal;
                    app.select_context(context);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laike_core::Config;
    use tokio::sync::mpsc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(&Config::new(), tx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn editing_is_utf8_safe() {
        let mut app = app();
        type_str(&mut app, "火锅文案");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "火锅案");
        assert_eq!(app.input_cursor, 2);
        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.input, "锅案");
    }

    #[test]
    fn alt_enter_inserts_a_newline() {
        let mut app = app();
        type_str(&mut app, "第一行");
        handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        type_str(&mut app, "第二行");
        assert_eq!(app.input, "第一行\n第二行");
        assert_eq!(app.session.messages().len(), 1);
    }

    #[test]
    fn tab_cycles_panes() {
        let mut app = app();
        assert_eq!(app.focus, FocusPane::Input);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::Sidebar);
        assert_eq!(app.input_mode, InputMode::Normal);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::Transcript);
        assert!(app.selected_control.is_some());
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::Input);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn q_types_while_editing_and_quits_otherwise() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.input, "q");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn digits_fill_a_chip_only_outside_editing() {
        let mut app = app();
        app.select_context(NavContext::Agent);

        // Editing: digits are plain text.
        type_str(&mut app, "3");
        assert_eq!(app.input, "3");
        press(&mut app, KeyCode::Backspace);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.input, "帮我写一段火锅套餐的推广文案");
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.session.messages().len(), 1);
    }

    #[test]
    fn ctrl_c_quits_from_a_popup() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('K'));
        assert!(app.show_api_key_input);
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn sidebar_click_switches_context() {
        let mut app = app();
        app.sidebar_area = Some(Rect::new(0, 1, 20, 8));
        handle_mouse(
            &mut app,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: 3,
                row: 6,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert_eq!(app.session.context(), NavContext::Diagnosis);
    }
}
