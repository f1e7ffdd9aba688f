use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use debater_core::InputIntent;

use crate::app::{App, FocusPane, Prompt};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize => app.scroll_chat_to_bottom(),
        AppEvent::Tick => app.tick().await,
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.prompt.is_some() {
        handle_prompt(app, key);
        return;
    }

    match key.code {
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return;
        }
        _ => {}
    }

    match app.focus {
        FocusPane::Notebooks => handle_notebooks(app, key),
        FocusPane::Documents => handle_documents(app, key),
        FocusPane::Chat => handle_chat(app, key),
    }
}

fn handle_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_prompt(),
        KeyCode::Enter => app.commit_prompt(),
        KeyCode::Char(c) => app.prompt_input.insert(c),
        KeyCode::Backspace => app.prompt_input.backspace(),
        KeyCode::Delete => app.prompt_input.delete(),
        KeyCode::Left => app.prompt_input.move_left(),
        KeyCode::Right => app.prompt_input.move_right(),
        KeyCode::Home => app.prompt_input.move_home(),
        KeyCode::End => app.prompt_input.move_end(),
        _ => {}
    }
}

fn handle_chat(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::PageUp => {
            let page = app.chat_height.max(1);
            app.scroll_chat_up(page);
            return;
        }
        KeyCode::PageDown => {
            let page = app.chat_height.max(1);
            app.scroll_chat_down(page);
            return;
        }
        KeyCode::Esc => {
            app.focus = FocusPane::Notebooks;
            return;
        }
        _ => {}
    }

    // The input is disabled while a debate is generating.
    if app.is_generating() {
        return;
    }

    match key.code {
        KeyCode::Enter => {
            let modifier_held = key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
            app.apply_intent(InputIntent::for_enter(modifier_held));
        }
        // Some terminals report Shift+Enter as Ctrl+J
        KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.apply_intent(InputIntent::InsertNewline);
        }
        KeyCode::Char(c) => app.input.insert(c),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.move_home(),
        KeyCode::End => app.input.move_end(),
        _ => {}
    }
}

fn handle_notebooks(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.notebook_down(),
        KeyCode::Char('k') | KeyCode::Up => app.notebook_up(),
        KeyCode::Char('n') => app.open_prompt(Prompt::NewNotebook),
        KeyCode::Char('i') | KeyCode::Char('/') => app.focus = FocusPane::Chat,
        _ => {}
    }
}

fn handle_documents(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.document_down(),
        KeyCode::Char('k') | KeyCode::Up => app.document_up(),
        KeyCode::Char('r') => app.start_refresh(),
        KeyCode::Char('u') => app.open_prompt(Prompt::UploadPaths),
        KeyCode::Char('b') => app.start_create_database(),
        KeyCode::Enter => app.select_document(),
        KeyCode::Char('i') | KeyCode::Char('/') => app.focus = FocusPane::Chat,
        _ => {}
    }
}
