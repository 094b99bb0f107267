//! Test harness for query input integration tests
//!
//! Drives a [`QueryEditor`] through key and mouse events without a terminal.

use super::*;
use crate::vocabulary::Vocabulary;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Test harness for scripting query input interactions
pub struct QueryInputHarness {
    editor: QueryEditor,
    submitted: Vec<String>,
}

impl QueryInputHarness {
    /// Editor over the query keywords, with the query presets
    pub fn new() -> Self {
        Self::with_autocom(Autocom::default())
    }

    /// Editor over a custom word list
    pub fn with_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut autocom = Autocom::default();
        autocom.set_vocabulary(Vocabulary::from_words(words));
        Self::with_autocom(autocom)
    }

    pub fn with_autocom(autocom: Autocom) -> Self {
        Self {
            editor: QueryEditor::new(autocom),
            submitted: Vec::new(),
        }
    }

    /// Start from existing text, caret at the end
    pub fn with_content(mut self, content: &str) -> Self {
        self.editor.set_content(content);
        self
    }

    /// Send a string of characters to the editor
    pub fn type_text(&mut self, text: &str) -> &mut Self {
        for ch in text.chars() {
            self.send_key(KeyCode::Char(ch));
        }
        self
    }

    /// Send a key event
    pub fn send_key(&mut self, code: KeyCode) -> &mut Self {
        self.send_key_with_modifiers(code, KeyModifiers::NONE)
    }

    /// Send a key event with modifiers
    pub fn send_key_with_modifiers(&mut self, code: KeyCode, modifiers: KeyModifiers) -> &mut Self {
        if let KeyResult::Submit(query) = self.editor.handle_key_event(KeyEvent::new(code, modifiers)) {
            self.submitted.push(query);
        }
        self
    }

    pub fn tab(&mut self) -> &mut Self {
        self.send_key(KeyCode::Tab)
    }

    pub fn enter(&mut self) -> &mut Self {
        self.send_key(KeyCode::Enter)
    }

    pub fn escape(&mut self) -> &mut Self {
        self.send_key(KeyCode::Esc)
    }

    pub fn up(&mut self) -> &mut Self {
        self.send_key(KeyCode::Up)
    }

    pub fn down(&mut self) -> &mut Self {
        self.send_key(KeyCode::Down)
    }

    pub fn backspace(&mut self) -> &mut Self {
        self.send_key(KeyCode::Backspace)
    }

    pub fn left(&mut self) -> &mut Self {
        self.send_key(KeyCode::Left)
    }

    /// Shift+Left, extending the selection
    pub fn shift_left(&mut self) -> &mut Self {
        self.send_key_with_modifiers(KeyCode::Left, KeyModifiers::SHIFT)
    }

    /// Click suggestion row `index`
    pub fn click(&mut self, index: usize) -> &mut Self {
        self.editor.click_suggestion(index);
        self
    }

    pub fn focus(&mut self, has_focus: bool) -> &mut Self {
        self.editor.set_focus(has_focus);
        self
    }

    pub fn content(&self) -> &str {
        self.editor.content()
    }

    pub fn cursor_pos(&self) -> usize {
        self.editor.cursor_pos()
    }

    /// Queries submitted with Enter so far
    pub fn submitted(&self) -> &[String] {
        &self.submitted
    }

    pub fn editor(&self) -> &QueryEditor {
        &self.editor
    }

    /// Check if the suggestion popup is shown
    pub fn is_completion_shown(&self) -> bool {
        self.editor.popup_state().is_active()
    }

    /// Suggestions currently shown
    pub fn completion_options(&self) -> Vec<String> {
        self.editor
            .popup_state()
            .suggestions()
            .map(|active| active.candidates.clone())
            .unwrap_or_default()
    }

    /// The highlighted suggestion (if any)
    pub fn selected_completion(&self) -> Option<String> {
        self.editor
            .popup_state()
            .suggestions()
            .and_then(|active| active.selected().map(str::to_string))
    }

    /// Assert that the content equals expected
    pub fn assert_content(&mut self, expected: &str) -> &mut Self {
        let actual = self.content();
        assert_eq!(
            actual, expected,
            "\nExpected content: {:?}\nActual content: {:?}",
            expected, actual
        );
        self
    }

    /// Assert that completion is showing
    pub fn assert_completion_shown(&mut self) -> &mut Self {
        assert!(
            self.is_completion_shown(),
            "Expected suggestions to be shown, but they're hidden"
        );
        self
    }

    /// Assert that completion is hidden
    pub fn assert_completion_hidden(&mut self) -> &mut Self {
        assert!(
            !self.is_completion_shown(),
            "Expected suggestions to be hidden, but they're shown: {:?}",
            self.completion_options()
        );
        self
    }

    /// Assert that completion contains specific option
    pub fn assert_completion_contains(&mut self, option: &str) -> &mut Self {
        let options = self.completion_options();
        assert!(
            options.iter().any(|o| o == option),
            "Expected suggestions to contain {:?}, got: {:?}",
            option,
            options
        );
        self
    }

    /// Assert which suggestion is highlighted
    pub fn assert_selected(&mut self, expected: &str) -> &mut Self {
        let selected = self.selected_completion();
        assert_eq!(
            selected.as_deref(),
            Some(expected),
            "\nExpected selection: {:?}\nActual selection: {:?}",
            expected,
            selected
        );
        self
    }
}

impl Default for QueryInputHarness {
    fn default() -> Self {
        Self::new()
    }
}
