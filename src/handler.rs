use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::info;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_template_picker {
        handle_template_picker(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_template_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_template_picker = false;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.template_picker_nav_down();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.template_picker_nav_up();
        }
        KeyCode::Enter => {
            app.select_template();
        }
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Tab only moves focus; there is no trap
        KeyCode::Tab => {
            app.focus = app.focus.next();
            if app.focus == FocusPane::Transcript && app.transcript_state.selected().is_none() {
                app.transcript_nav_down();
            }
        }

        KeyCode::Char('i') | KeyCode::Enter if app.focus == FocusPane::Prompt => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('s') => app.submit_prompt(),
        KeyCode::Char('p') => app.open_template_picker(),

        // Generation parameters
        KeyCode::Char('m') => app.config.set_model(app.config.model().next()),
        KeyCode::Char('M') => app.config.set_model(app.config.model().prev()),
        KeyCode::Char('+') | KeyCode::Char('=') => app.config.increase_temperature(),
        KeyCode::Char('-') => app.config.decrease_temperature(),
        KeyCode::Char(']') => app.config.increase_max_tokens(),
        KeyCode::Char('[') => app.config.decrease_max_tokens(),

        KeyCode::Char('t') => {
            let theme = app.toggle_theme();
            info!(theme = theme.as_str(), "theme toggled");
        }

        // Transcript
        KeyCode::Char('j') | KeyCode::Down => app.transcript_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.transcript_nav_up(),
        KeyCode::Char('c') => app.copy_selected(),
        KeyCode::Char('e') => app.export_transcript(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    // Settings and theme stay editable while typing
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('t') => {
                let theme = app.toggle_theme();
                info!(theme = theme.as_str(), "theme toggled");
            }
            KeyCode::Char('n') => app.config.set_model(app.config.model().next()),
            KeyCode::Up => app.config.increase_temperature(),
            KeyCode::Down => app.config.decrease_temperature(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.focus = app.focus.next();
        }
        KeyCode::Enter => {
            if app.session.can_submit() {
                app.submit_prompt();
            }
        }
        KeyCode::PageUp => app.config.increase_max_tokens(),
        KeyCode::PageDown => app.config.decrease_max_tokens(),
        KeyCode::Backspace => app.session.prompt_mut().backspace(),
        KeyCode::Delete => app.session.prompt_mut().delete(),
        KeyCode::Left => app.session.prompt_mut().move_left(),
        KeyCode::Right => app.session.prompt_mut().move_right(),
        KeyCode::Home => app.session.prompt_mut().move_home(),
        KeyCode::End => app.session.prompt_mut().move_end(),
        KeyCode::Char(c) => app.session.prompt_mut().insert(c),
        _ => {}
    }
}
