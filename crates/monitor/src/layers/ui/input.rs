use crate::layers::service::{spawn_detection, DetectClient, UiEvent};
use crate::layers::storage::LocalStore;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;

use super::app::AppState;
use super::editor::TextEditor;

/// Handles the UI loop needs beyond the app state itself.
pub(crate) struct UiContext {
    pub(crate) store: LocalStore,
    pub(crate) client: DetectClient,
    pub(crate) ui_tx: mpsc::Sender<UiEvent>,
    pub(crate) report_path: PathBuf,
}

/// Returns true when the UI should exit.
pub(crate) fn handle_key_event(key: KeyEvent, app: &mut AppState, ctx: &UiContext) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if app.confirm_quit {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') if ctrl => return true,
            KeyCode::Esc => {
                app.confirm_quit = false;
                return false;
            }
            _ => {
                app.confirm_quit = false;
            }
        }
    }

    let now = Instant::now();
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') if ctrl => {
            app.confirm_quit = true;
            return false;
        }
        KeyCode::Char('r') | KeyCode::Char('R') if ctrl => {
            trigger_detection(app, ctx, now);
            return false;
        }
        KeyCode::F(5) => {
            trigger_detection(app, ctx, now);
            return false;
        }
        KeyCode::Char('t') | KeyCode::Char('T') if ctrl => {
            app.toggle_theme(&ctx.store);
            return false;
        }
        KeyCode::Char('l') | KeyCode::Char('L') if ctrl => {
            app.reset();
            return false;
        }
        KeyCode::Char('e') | KeyCode::Char('E') if ctrl => {
            app.export_report(&ctx.report_path, now);
            return false;
        }
        KeyCode::PageDown => {
            app.scroll_down(app.page_size());
            return false;
        }
        KeyCode::PageUp => {
            app.scroll_up(app.page_size());
            return false;
        }
        _ => {}
    }

    if app.settings_open {
        handle_settings_key(key, app, ctx, now);
    } else {
        handle_editor_key(key, app);
    }
    false
}

fn trigger_detection(app: &mut AppState, ctx: &UiContext, now: Instant) {
    if let Some(request) = app.begin_detection(now) {
        spawn_detection(ctx.client.clone(), request, ctx.ui_tx.clone());
    }
}

fn handle_settings_key(key: KeyEvent, app: &mut AppState, ctx: &UiContext, now: Instant) {
    match key.code {
        KeyCode::Esc => app.close_settings(),
        KeyCode::Char('s') | KeyCode::Char('S')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.close_settings()
        }
        KeyCode::Enter => app.save_settings(&ctx.store, now),
        KeyCode::Tab | KeyCode::Down => app.form.selected = app.form.selected.next(),
        KeyCode::BackTab | KeyCode::Up => app.form.selected = app.form.selected.prev(),
        KeyCode::F(2) => app.form.reveal_key = !app.form.reveal_key,
        _ => {
            edit_line(key, app.form.selected_mut());
        }
    }
}

fn handle_editor_key(key: KeyEvent, app: &mut AppState) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if matches!(key.code, KeyCode::Char('s') | KeyCode::Char('S')) {
            app.open_settings();
        }
        return;
    }
    let editor = &mut app.editor;
    match key.code {
        KeyCode::Enter => editor.insert_char('\n'),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        _ => {
            if !edit_line(key, editor) {
                return;
            }
        }
    }
    app.on_text_changed();
}

/// Single-line editing keys shared by the text area and settings fields.
fn edit_line(key: KeyEvent, editor: &mut TextEditor) -> bool {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return false;
    }
    match key.code {
        KeyCode::Char(ch) => editor.insert_char(ch),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        _ => return false,
    }
    true
}

/// Bracketed paste goes to the focused field. Settings fields stay on one line.
pub(crate) fn handle_paste(text: &str, app: &mut AppState) {
    if app.settings_open {
        let line: String = text.chars().filter(|ch| !ch.is_control()).collect();
        app.form.selected_mut().insert_str(&line);
    } else {
        app.editor.insert_str(text);
        app.on_text_changed();
    }
}
