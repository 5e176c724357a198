//! Input handling for the TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::api::models::BackupKind;

use super::app::{Action, InputMode};

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Keys while browsing tables.
fn browse_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => Some(Action::NextTab),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => Some(Action::PrevTab),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
        KeyCode::Char(' ') => Some(Action::ToggleSelect),
        KeyCode::Char('a') => Some(Action::SelectAll),
        KeyCode::Char('r') | KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::Char('f') => Some(Action::CreateBackup(BackupKind::Full)),
        KeyCode::Char('i') => Some(Action::CreateBackup(BackupKind::Incremental)),
        KeyCode::Char('s') => Some(Action::NewSchedule),
        KeyCode::Char('t') => Some(Action::ToggleSchedule),
        KeyCode::Char('m') | KeyCode::Enter => Some(Action::ManageSchedule),
        KeyCode::Char('d') | KeyCode::Delete => Some(Action::Delete),
        KeyCode::Char('c') => Some(Action::Cleanup),
        KeyCode::Char('n') => Some(Action::NewSnapshot),
        KeyCode::Char('o') => Some(Action::Restore),
        KeyCode::Char('I') => Some(Action::ShowInfo),
        _ => None,
    }
}

/// Keys while a form is open. Printable characters go to the focused field.
fn form_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Tab | KeyCode::Down => Some(Action::Down),
        KeyCode::BackTab | KeyCode::Up => Some(Action::Up),
        KeyCode::Left => Some(Action::Left),
        KeyCode::Right => Some(Action::Right),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) => Some(Action::Char(c)),
        _ => None,
    }
}

fn confirm_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Char('y')),
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => Some(Action::Char('n')),
        _ => None,
    }
}

fn message_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Some(Action::Back),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

/// Convert a crossterm key event to an Action for the given mode.
pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if is_ctrl_c(&key) {
        return Some(Action::Quit);
    }
    match mode {
        InputMode::Browse => browse_key(key),
        InputMode::Form => form_key(key),
        InputMode::Confirm => confirm_key(key),
        InputMode::Message => message_key(key),
    }
}

/// Convert a crossterm Event to an Action.
pub fn handle_event(event: Event, mode: InputMode) -> Option<Action> {
    match event {
        Event::Key(key) => handle_key_event(key, mode),
        _ => None,
    }
}
