//! Suggestion session state machine
//!
//! Tracks the visible suggestion list, the selected row and whether display
//! is suppressed. Transitions are pure: the session never reads the buffer
//! and never paints anything, it tells its owner what to do next.

use super::context::PrefixMatch;
use super::key_event::{KeyInput, SessionKey};
use tracing::debug;

/// Suggestions currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSuggestions {
    /// Ranked candidates, best first
    pub candidates: Vec<String>,
    /// Highlighted row, always `< candidates.len()`
    pub selected_index: usize,
    /// The word the candidates would replace
    pub prefix: PrefixMatch,
}

impl ActiveSuggestions {
    /// The highlighted candidate
    pub fn selected(&self) -> Option<&str> {
        self.candidates.get(self.selected_index).map(String::as_str)
    }
}

/// What the popup should show
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Nothing to suggest
    Inactive,
    /// Suggestions are shown
    Active(ActiveSuggestions),
    /// Display withheld (after Escape, an insertion, or Shift) until the
    /// user resumes typing
    Suppressed,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, SessionState::Suppressed)
    }

    /// The active suggestions, if shown
    pub fn suggestions(&self) -> Option<&ActiveSuggestions> {
        match self {
            SessionState::Active(active) => Some(active),
            _ => None,
        }
    }
}

/// What the owner must do after a key went through the session
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    /// Selection moved; the key is consumed
    Navigate,
    /// Insert `candidate` over `prefix`; the key is consumed and the session
    /// is now suppressed
    Commit {
        candidate: String,
        prefix: PrefixMatch,
    },
    /// Display suppressed; the key keeps its native effect
    Suppress,
    /// Suppression cleared; re-detect once the key's native effect is applied
    Refresh,
}

impl KeyAction {
    /// Whether the host must skip the key's native effect
    pub fn consumes_key(&self) -> bool {
        matches!(self, KeyAction::Navigate | KeyAction::Commit { .. })
    }
}

/// State of the suggestion session
#[derive(Debug, Clone, Default)]
pub struct SuggestionSession {
    /// Shown suggestions (`None` while inactive or suppressed)
    active: Option<ActiveSuggestions>,
    /// Display withheld until the next non-suppressing key
    suppressed: bool,
}

impl SuggestionSession {
    /// Create an inactive session
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of what should be shown
    pub fn state(&self) -> SessionState {
        if self.suppressed {
            return SessionState::Suppressed;
        }
        match &self.active {
            Some(active) => SessionState::Active(active.clone()),
            None => SessionState::Inactive,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn active(&self) -> Option<&ActiveSuggestions> {
        if self.suppressed {
            None
        } else {
            self.active.as_ref()
        }
    }

    /// Apply a fresh detect/rank result
    ///
    /// `found` is the detected prefix and its ranked candidates, if any. The
    /// previous selection survives a refresh while it is still in range;
    /// otherwise, and for a newly shown list, the first row is selected.
    pub fn refresh(&mut self, found: Option<(PrefixMatch, Vec<String>)>, has_focus: bool) {
        let (prefix, candidates) = match found {
            Some((prefix, candidates))
                if has_focus && !self.suppressed && !candidates.is_empty() =>
            {
                (prefix, candidates)
            }
            _ => {
                self.active = None;
                return;
            }
        };

        let previous = self.active.as_ref().map_or(0, |a| a.selected_index);
        let selected_index = if previous < candidates.len() {
            previous
        } else {
            0
        };
        self.active = Some(ActiveSuggestions {
            candidates,
            selected_index,
            prefix,
        });
    }

    /// Move selection to next item (wrapping)
    pub fn next(&mut self) {
        if let Some(active) = self.active.as_mut() {
            if !active.candidates.is_empty() {
                active.selected_index = (active.selected_index + 1) % active.candidates.len();
            }
        }
    }

    /// Move selection to previous item (wrapping)
    pub fn previous(&mut self) {
        if let Some(active) = self.active.as_mut() {
            let len = active.candidates.len();
            if len > 0 {
                active.selected_index = (active.selected_index + len - 1) % len;
            }
        }
    }

    /// Withhold display until the user resumes typing
    pub fn suppress(&mut self) {
        self.suppressed = true;
        self.active = None;
    }

    /// Take the candidate at `index` and suppress
    fn commit(&mut self, index: usize) -> Option<KeyAction> {
        let active = self.active.as_ref()?;
        let candidate = active.candidates.get(index)?.clone();
        let prefix = active.prefix.clone();
        self.suppress();
        Some(KeyAction::Commit { candidate, prefix })
    }

    /// React to a keydown
    pub fn handle_key(&mut self, input: KeyInput) -> KeyAction {
        if let Some(active) = self.active() {
            let selected = active.selected_index;
            match input.key {
                SessionKey::Tab | SessionKey::Enter => {
                    if let Some(action) = self.commit(selected) {
                        debug!("Committing suggestion {}", selected);
                        return action;
                    }
                }
                SessionKey::Up if !input.shift => {
                    self.previous();
                    return KeyAction::Navigate;
                }
                SessionKey::Down if !input.shift => {
                    self.next();
                    return KeyAction::Navigate;
                }
                SessionKey::Escape => {
                    debug!("Suggestions dismissed");
                    self.suppress();
                    return KeyAction::Suppress;
                }
                _ => {}
            }
        }

        if input.key == SessionKey::Shift || (input.shift && is_arrow(input.key)) {
            // Shift selection in progress: keep the popup out of the way
            self.suppress();
            KeyAction::Suppress
        } else {
            self.suppressed = false;
            KeyAction::Refresh
        }
    }

    /// Mouse-down on row `index`: select it and commit
    pub fn click(&mut self, index: usize) -> Option<KeyAction> {
        if self.suppressed {
            return None;
        }
        if let Some(active) = self.active.as_mut() {
            if index < active.candidates.len() {
                active.selected_index = index;
            }
        }
        self.commit(index)
    }
}

fn is_arrow(key: SessionKey) -> bool {
    matches!(key, SessionKey::Up | SessionKey::Down)
}
