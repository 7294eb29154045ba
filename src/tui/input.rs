//! Input handling for the TUI.
//!
//! Processes keyboard events and updates application state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::AppMode;
use crate::App;

/// Handle keyboard events.
pub fn handle_events(key: KeyEvent, app: &mut App) {
    // Ctrl+C always quits, unsaved changes or not
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode {
        AppMode::Help => handle_help_mode(key, app),
        AppMode::ConfirmQuit => handle_confirm_quit_mode(key, app),
        AppMode::Normal => handle_normal_mode(key, app),
    }
}

fn handle_normal_mode(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => app.next_plugin(),
        KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => app.previous_plugin(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_widget(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_widget(),
        KeyCode::Enter | KeyCode::Char(' ') => app.press_selected(),
        KeyCode::Char('r') => {
            app.reload();
        }
        KeyCode::Char('s') => app.save_from_ui(),
        KeyCode::Char('d') => app.discard_from_ui(),
        KeyCode::Char('?') => app.show_help(),
        KeyCode::Char('q') | KeyCode::Esc => app.request_quit(),
        _ => {}
    }
}

fn handle_help_mode(key: KeyEvent, app: &mut App) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('?' | 'q') | KeyCode::Enter) {
        app.dismiss_help();
    }
}

fn handle_confirm_quit_mode(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('y' | 'Y' | 'q') => app.quit(),
        KeyCode::Char('s' | 'S') => {
            app.save_from_ui();
            if !app.is_modified() {
                app.quit();
            }
        }
        KeyCode::Char('n' | 'N') | KeyCode::Esc => app.mode = AppMode::Normal,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(dir: &TempDir) -> App {
        let mut config = Config::default();
        config.plugins.store_dir = Some(dir.path().join("store"));
        App::with_config(config, dir.path().to_path_buf())
    }

    #[test]
    fn test_quit_without_changes() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        handle_events(key(KeyCode::Char('q')), &mut app);
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        handle_events(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut app);
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_toggle() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        handle_events(key(KeyCode::Char('?')), &mut app);
        assert!(app.is_help_shown());
        handle_events(key(KeyCode::Esc), &mut app);
        assert!(!app.is_help_shown());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_reload_key() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        handle_events(key(KeyCode::Char('r')), &mut app);
        assert!(app.last_report.is_some());
    }

    #[test]
    fn test_confirm_quit_cancel() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.mode = AppMode::ConfirmQuit;
        handle_events(key(KeyCode::Char('n')), &mut app);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(!app.should_quit);
    }
}
