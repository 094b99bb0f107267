//! Fuzzy prefix autocompletion
//!
//! Provides:
//! - Alignment scoring of typed prefixes against candidates
//! - Ranking of a vocabulary (threshold, count, context filter)
//! - Detection of the word being typed at the caret
//! - The suggestion session (selection, suppression, commit)
//! - Insertion of the chosen candidate

mod context;
mod engine;
mod insertion;
mod key_event;
mod matching;
mod scoring;
mod state;

pub use context::{
    detect_prefix, PrefixMatch, WordPatterns, DEFAULT_WORD_PATTERN, QUERY_CONTINUE_PATTERN,
    QUERY_PREFIX_PATTERN,
};
pub use engine::{Autocom, BufferSnapshot, KeyOutcome, SuggestionRenderer};
pub use insertion::{insert_candidate, Insertion};
pub use key_event::{KeyInput, SessionKey};
pub use matching::{
    rank, QueryClauseFilter, Ranker, RegionFilter, ScoredCandidate, LATTER_KEYWORDS,
};
pub use scoring::{score, ScoreCache};
pub use state::{ActiveSuggestions, KeyAction, SessionState, SuggestionSession};
