//! Key bindings.
//!
//! Pure mapping from a key press to an [`Intent`], given which part of the
//! screen has focus.

use crate::types::Filter;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Part of the screen receiving keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// The new-item input
    #[default]
    Input,
    /// The item list
    List,
    /// The in-place edit field of the selected item
    Edit,
}

/// What a key press asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Leave the application
    Quit,
    /// Type a character into the focused field
    Insert(char),
    /// Erase the last character of the focused field
    Backspace,
    /// Submit the focused field (add, or save the edit)
    Submit,
    /// Move focus between input and list
    SwitchPane,
    /// Select the previous row
    Up,
    /// Select the next row
    Down,
    /// Toggle completion of the selected row
    Toggle,
    /// Delete the selected row
    Delete,
    /// Edit the selected row
    BeginEdit,
    /// Abandon the edit
    CancelEdit,
    /// Complete or reopen everything
    ToggleAll,
    /// Delete completed items
    ClearCompleted,
    /// Change the filter
    Filter(Filter),
    /// Close the error banner
    DismissError,
}

/// Map a key press to an intent
#[must_use]
pub fn map_key(mode: Mode, key: KeyEvent) -> Option<Intent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Intent::Quit),
            _ => None,
        };
    }

    match mode {
        Mode::Input => match key.code {
            KeyCode::Enter => Some(Intent::Submit),
            KeyCode::Tab | KeyCode::Down => Some(Intent::SwitchPane),
            KeyCode::Backspace => Some(Intent::Backspace),
            KeyCode::Char(c) => Some(Intent::Insert(c)),
            _ => None,
        },
        // Leaving the field through Tab counts as a blur and saves
        Mode::Edit => match key.code {
            KeyCode::Enter | KeyCode::Tab => Some(Intent::Submit),
            KeyCode::Esc => Some(Intent::CancelEdit),
            KeyCode::Backspace => Some(Intent::Backspace),
            KeyCode::Char(c) => Some(Intent::Insert(c)),
            _ => None,
        },
        Mode::List => match key.code {
            KeyCode::Tab => Some(Intent::SwitchPane),
            KeyCode::Up | KeyCode::Char('k') => Some(Intent::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Intent::Down),
            KeyCode::Char(' ') => Some(Intent::Toggle),
            KeyCode::Delete | KeyCode::Char('d') => Some(Intent::Delete),
            KeyCode::Enter | KeyCode::Char('e') => Some(Intent::BeginEdit),
            KeyCode::Char('a') => Some(Intent::ToggleAll),
            KeyCode::Char('c') => Some(Intent::ClearCompleted),
            KeyCode::Char('1') => Some(Intent::Filter(Filter::All)),
            KeyCode::Char('2') => Some(Intent::Filter(Filter::Active)),
            KeyCode::Char('3') => Some(Intent::Filter(Filter::Completed)),
            KeyCode::Char('x') => Some(Intent::DismissError),
            KeyCode::Char('q') => Some(Intent::Quit),
            _ => None,
        },
    }
}
