//! Autocomplete facade for embedding hosts
//!
//! Wires prefix detection, ranking, the suggestion session and insertion
//! together behind the event interface a text input host drives:
//!
//! 1. On keydown, call [`Autocom::on_key`]. If the outcome says the key was
//!    consumed, skip the key's native effect (and apply the insertion, if
//!    any); otherwise apply it as usual.
//! 2. After the native effect has landed (text and caret updated), report the
//!    buffer with [`Autocom::on_buffer_changed`]. Detection and ranking only
//!    ever run here, so they always see the committed caret position.
//!
//! The render callback is invoked with the state after every transition and
//! must be idempotent.

use super::context::{detect_prefix, PrefixMatch, WordPatterns};
use super::insertion::{insert_candidate, Insertion};
use super::key_event::{KeyInput, SessionKey};
use super::matching::{QueryClauseFilter, Ranker, RegionFilter};
use super::state::{KeyAction, SessionState, SuggestionSession};
use crate::config::{CompleterConfig, MatchConfig};
use crate::error::AutocomResult;
use crate::vocabulary::Vocabulary;
use tracing::{debug, info};

/// Paints the suggestion list
pub trait SuggestionRenderer {
    fn render(&mut self, state: &SessionState);
}

impl<F> SuggestionRenderer for F
where
    F: FnMut(&SessionState),
{
    fn render(&mut self, state: &SessionState) {
        self(state)
    }
}

/// Last buffer reported by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferSnapshot {
    pub text: String,
    pub cursor_start: usize,
    pub cursor_end: usize,
    pub has_focus: bool,
}

/// Result of feeding a key to the session
#[derive(Debug, Clone, PartialEq)]
pub struct KeyOutcome {
    /// Host must not apply the key's native effect
    pub consumed: bool,
    /// Text and caret to apply when a suggestion was committed
    pub insertion: Option<Insertion>,
    /// Host must report the buffer once the native effect is applied
    pub refresh_pending: bool,
    /// Session state after the key
    pub state: SessionState,
}

/// Autocompletion for one text input
pub struct Autocom {
    vocabulary: Vocabulary,
    patterns: WordPatterns,
    ranker: Ranker,
    region_filter: Option<Box<dyn RegionFilter>>,
    session: SuggestionSession,
    buffer: BufferSnapshot,
    refresh_pending: bool,
    renderer: Option<Box<dyn SuggestionRenderer>>,
    completion_hook: Option<Box<dyn FnMut(&Insertion)>>,
}

impl Autocom {
    /// Create an autocompleter over `vocabulary`
    pub fn new(vocabulary: Vocabulary, patterns: WordPatterns, config: MatchConfig) -> Self {
        Self {
            vocabulary,
            patterns,
            ranker: Ranker::new(config),
            region_filter: None,
            session: SuggestionSession::new(),
            buffer: BufferSnapshot::default(),
            refresh_pending: false,
            renderer: None,
            completion_hook: None,
        }
    }

    /// Set up from a config file
    ///
    /// When the built-in query keywords are in use, the query clause filter
    /// is installed as well.
    pub fn from_config(config: &CompleterConfig) -> AutocomResult<Self> {
        config.matching.validate()?;
        let mut autocom = Self::new(config.vocabulary(), config.word_patterns()?, config.matching);
        if config.vocabulary.keywords.is_none() {
            autocom.set_region_filter(QueryClauseFilter);
        }
        info!(
            "Autocomplete configured with {} candidates",
            autocom.vocabulary.len()
        );
        Ok(autocom)
    }

    /// Replace vocabulary, patterns and tunables
    ///
    /// The session is kept; the next refresh ranks against the new setup.
    pub fn configure(&mut self, vocabulary: Vocabulary, patterns: WordPatterns, config: MatchConfig) {
        debug!("Reconfigured with {} candidates", vocabulary.len());
        self.vocabulary = vocabulary;
        self.patterns = patterns;
        self.ranker.set_config(config);
    }

    /// Replace only the vocabulary (e.g. once metric names arrive)
    pub fn set_vocabulary(&mut self, vocabulary: Vocabulary) {
        self.vocabulary = vocabulary;
    }

    pub fn set_region_filter<R: RegionFilter + 'static>(&mut self, filter: R) {
        self.region_filter = Some(Box::new(filter));
    }

    pub fn clear_region_filter(&mut self) {
        self.region_filter = None;
    }

    pub fn set_renderer<R: SuggestionRenderer + 'static>(&mut self, renderer: R) {
        self.renderer = Some(Box::new(renderer));
    }

    /// Called after every insertion, once text and caret are updated
    pub fn set_completion_hook<F: FnMut(&Insertion) + 'static>(&mut self, hook: F) {
        self.completion_hook = Some(Box::new(hook));
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn config(&self) -> &MatchConfig {
        self.ranker.config()
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// The buffer as last reported (or as left by an insertion)
    pub fn buffer(&self) -> &BufferSnapshot {
        &self.buffer
    }

    /// Whether a key is waiting for its buffer report
    pub fn is_refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// The host's text or caret changed (or focus moved)
    pub fn on_buffer_changed(
        &mut self,
        text: &str,
        cursor_start: usize,
        cursor_end: usize,
        has_focus: bool,
    ) -> SessionState {
        self.buffer = BufferSnapshot {
            text: text.to_string(),
            cursor_start,
            cursor_end,
            has_focus,
        };
        self.refresh()
    }

    /// Re-run detection and ranking on the last reported buffer
    pub fn refresh(&mut self) -> SessionState {
        self.refresh_pending = false;

        let found = if self.buffer.has_focus && !self.session.is_suppressed() {
            self.detect_and_rank()
        } else {
            None
        };
        self.session.refresh(found, self.buffer.has_focus);
        self.render()
    }

    fn detect_and_rank(&self) -> Option<(PrefixMatch, Vec<String>)> {
        let buffer = &self.buffer;
        let prefix = detect_prefix(
            &buffer.text,
            buffer.cursor_start,
            buffer.cursor_end,
            &self.patterns,
        )?;

        let (before, after) = buffer.text.split_at(prefix.to);
        let filter = self.region_filter.as_deref();
        let candidates = self
            .ranker
            .rank_filtered(&prefix.text, &self.vocabulary, |candidate: &str| {
                filter.map_or(true, |f| f.admits(before, after, candidate))
            })?;

        Some((prefix, candidates))
    }

    /// A key went down in the input
    ///
    /// While a previous key still awaits its buffer report, the snapshot is
    /// stale, so Tab/Enter don't commit: they pass through as plain keys and
    /// the next report catches up.
    pub fn on_key(&mut self, input: KeyInput) -> KeyOutcome {
        if self.refresh_pending && matches!(input.key, SessionKey::Tab | SessionKey::Enter) {
            debug!("Commit skipped, buffer report pending");
            return KeyOutcome {
                consumed: false,
                insertion: None,
                refresh_pending: true,
                state: self.session.state(),
            };
        }

        let action = self.session.handle_key(input);
        let consumed = action.consumes_key();

        let insertion = match action {
            KeyAction::Commit { candidate, prefix } => Some(self.apply(&candidate, &prefix)),
            KeyAction::Refresh => {
                self.refresh_pending = true;
                None
            }
            KeyAction::Navigate | KeyAction::Suppress => None,
        };

        let state = self.render();
        KeyOutcome {
            consumed,
            insertion,
            refresh_pending: self.refresh_pending,
            state,
        }
    }

    /// Mouse-down on suggestion row `index`
    pub fn on_suggestion_clicked(&mut self, index: usize) -> KeyOutcome {
        let insertion = match self.session.click(index) {
            Some(KeyAction::Commit { candidate, prefix }) => Some(self.apply(&candidate, &prefix)),
            _ => None,
        };

        let state = self.render();
        KeyOutcome {
            consumed: insertion.is_some(),
            insertion,
            refresh_pending: self.refresh_pending,
            state,
        }
    }

    fn apply(&mut self, candidate: &str, prefix: &PrefixMatch) -> Insertion {
        let insertion = insert_candidate(&self.buffer.text, prefix, candidate);
        self.buffer.text = insertion.text.clone();
        self.buffer.cursor_start = insertion.caret;
        self.buffer.cursor_end = insertion.caret;
        debug!("Inserted {:?} at {}", candidate, prefix.from);

        if let Some(hook) = self.completion_hook.as_mut() {
            hook(&insertion);
        }
        insertion
    }

    fn render(&mut self) -> SessionState {
        let state = self.session.state();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&state);
        }
        state
    }
}

impl Default for Autocom {
    fn default() -> Self {
        Self::new(
            Vocabulary::query_keywords(),
            WordPatterns::query_language(),
            MatchConfig::query_input(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn keywords() -> Autocom {
        Autocom::new(
            Vocabulary::from_words(["select", "sample", "from", "resolution"]),
            WordPatterns::default(),
            MatchConfig::default(),
        )
    }

    #[test]
    fn test_buffer_change_activates() {
        let mut autocom = keywords();
        let state = autocom.on_buffer_changed("sel", 3, 3, true);
        let active = state.suggestions().unwrap();
        assert_eq!(active.candidates[0], "select");
        assert_eq!(active.prefix, PrefixMatch::new(0, "sel"));
    }

    #[test]
    fn test_no_focus_is_inactive() {
        let mut autocom = keywords();
        assert_eq!(
            autocom.on_buffer_changed("sel", 3, 3, false),
            SessionState::Inactive
        );
    }

    #[test]
    fn test_tab_inserts_and_suppresses() {
        let mut autocom = keywords();
        autocom.on_buffer_changed("sel", 3, 3, true);

        let outcome = autocom.on_key(SessionKey::Tab.into());
        assert!(outcome.consumed);
        let insertion = outcome.insertion.unwrap();
        assert_eq!(insertion.text, "select");
        assert_eq!(insertion.caret, 6);
        assert_eq!(outcome.state, SessionState::Suppressed);

        // The caret move from the insertion doesn't bring the popup back
        let state = autocom.on_buffer_changed(&insertion.text, 6, 6, true);
        assert_eq!(state, SessionState::Suppressed);
    }

    #[test]
    fn test_other_key_defers_refresh() {
        let mut autocom = keywords();
        autocom.on_buffer_changed("se", 2, 2, true);
        let outcome = autocom.on_key(SessionKey::Other.into());
        assert!(!outcome.consumed);
        assert!(outcome.refresh_pending);
        assert!(autocom.is_refresh_pending());

        // Host applied the native effect ("l" typed) and reports back
        let state = autocom.on_buffer_changed("sel", 3, 3, true);
        assert!(state.is_active());
        assert!(!autocom.is_refresh_pending());
    }

    #[test]
    fn test_commit_waits_for_pending_report() {
        let mut autocom = keywords();
        autocom.on_buffer_changed("se", 2, 2, true);

        // Host inserted a space but hasn't reported it yet
        autocom.on_key(SessionKey::Other.into());
        let outcome = autocom.on_key(SessionKey::Tab.into());
        assert!(!outcome.consumed);
        assert_eq!(outcome.insertion, None);
        assert!(outcome.refresh_pending);

        // The Tab's own native effect lands too; nothing to complete after it
        let state = autocom.on_buffer_changed("se \t", 4, 4, true);
        assert_eq!(state, SessionState::Inactive);
        assert_eq!(autocom.buffer().text, "se \t");
    }

    #[test]
    fn test_commit_after_report_uses_reported_text() {
        let mut autocom = keywords();
        autocom.on_buffer_changed("se", 2, 2, true);
        autocom.on_key(SessionKey::Other.into());
        autocom.on_buffer_changed("sel", 3, 3, true);

        let outcome = autocom.on_key(SessionKey::Tab.into());
        assert!(outcome.consumed);
        assert_eq!(outcome.insertion.unwrap().text, "select");
    }

    #[test]
    fn test_renderer_sees_every_transition() {
        let seen: Rc<RefCell<Vec<SessionState>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut autocom = keywords();
        autocom.set_renderer(move |state: &SessionState| sink.borrow_mut().push(state.clone()));

        autocom.on_buffer_changed("s", 1, 1, true);
        autocom.on_key(SessionKey::Down.into());
        autocom.on_key(SessionKey::Escape.into());

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].is_active());
        assert_eq!(seen[1].suggestions().unwrap().selected_index, 1);
        assert_eq!(seen[2], SessionState::Suppressed);
    }

    #[test]
    fn test_completion_hook_runs_after_insert() {
        let inserted: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&inserted);

        let mut autocom = keywords();
        autocom.set_completion_hook(move |ins: &Insertion| sink.borrow_mut().push(ins.text.clone()));

        autocom.on_buffer_changed("select * fr", 11, 11, true);
        let outcome = autocom.on_suggestion_clicked(0);
        assert!(outcome.consumed);

        assert_eq!(*inserted.borrow(), vec!["select * from".to_string()]);
        assert_eq!(autocom.buffer().cursor_start, 13);
    }

    #[test]
    fn test_region_filter_applies() {
        let mut autocom = keywords();
        autocom.set_region_filter(QueryClauseFilter);

        let state = autocom.on_buffer_changed("select x where s", 16, 16, true);
        let active = state.suggestions().unwrap();
        // "select" is not allowed after a where clause
        assert_eq!(active.candidates, vec!["sample", "resolution"]);

        autocom.clear_region_filter();
        let state = autocom.refresh();
        assert_eq!(
            state.suggestions().unwrap().candidates,
            vec!["select", "sample", "resolution"]
        );
    }

    #[test]
    fn test_configure_swaps_vocabulary() {
        let mut autocom = keywords();
        autocom.configure(
            Vocabulary::from_words(["metrics"]),
            WordPatterns::default(),
            MatchConfig::default(),
        );
        let state = autocom.on_buffer_changed("me", 2, 2, true);
        assert_eq!(state.suggestions().unwrap().candidates, vec!["metrics"]);
    }

    #[test]
    fn test_from_config_installs_clause_filter() {
        let config = CompleterConfig::default();
        let mut autocom = Autocom::from_config(&config).unwrap();
        let state = autocom.on_buffer_changed("select cpu where x = 1 f", 24, 24, true);
        let candidates = &state.suggestions().unwrap().candidates;
        assert_eq!(candidates[0], "from");
        assert!(!candidates.iter().any(|c| c == "describe"));
    }
}
