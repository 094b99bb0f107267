//! Key input as seen by the suggestion session
//!
//! The session only cares about a handful of keys; hosts translate their
//! platform events into [`KeyInput`]. Terminal hosts can convert crossterm
//! events directly.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};

/// Keys the session reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKey {
    Tab,
    Enter,
    Up,
    Down,
    Escape,
    /// Shift pressed on its own
    Shift,
    /// Anything else (typing, deletion, caret movement, ...)
    Other,
}

/// One keydown, with whether Shift was held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: SessionKey,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: SessionKey) -> Self {
        Self { key, shift: false }
    }

    pub fn with_shift(key: SessionKey) -> Self {
        Self { key, shift: true }
    }
}

impl From<SessionKey> for KeyInput {
    fn from(key: SessionKey) -> Self {
        Self::new(key)
    }
}

impl From<KeyEvent> for KeyInput {
    fn from(event: KeyEvent) -> Self {
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);
        let key = match event.code {
            KeyCode::Tab | KeyCode::BackTab => SessionKey::Tab,
            KeyCode::Enter => SessionKey::Enter,
            KeyCode::Up => SessionKey::Up,
            KeyCode::Down => SessionKey::Down,
            KeyCode::Esc => SessionKey::Escape,
            KeyCode::Modifier(ModifierKeyCode::LeftShift)
            | KeyCode::Modifier(ModifierKeyCode::RightShift) => SessionKey::Shift,
            _ => SessionKey::Other,
        };
        Self {
            key,
            shift: shift || key == SessionKey::Shift || event.code == KeyCode::BackTab,
        }
    }
}
