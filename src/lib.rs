//! # Autocom - Fuzzy Prefix Autocompletion
//!
//! Autocom suggests completions for the word being typed in a text input. It
//! aligns the typed prefix against every candidate with a small dynamic
//! program that tolerates skipped characters and case differences, ranks the
//! vocabulary, and drives a suggestion popup from key events.
//!
//! ## Core Features
//!
//! - **Alignment Scoring**: earlier matches weigh more, skips cost tunable penalties
//! - **Ranking**: stable ordering, score threshold, suggestion cap, context filters
//! - **Prefix Detection**: configurable word and continuation patterns around the caret
//! - **Suggestion Session**: selection, suppression and commit driven by keys
//! - **Terminal Query Input**: a ratatui editor hosting the whole flow
//!
//! ## Quick Start
//!
//! ```rust
//! use autocom::completion::{Autocom, SessionKey, WordPatterns};
//! use autocom::config::MatchConfig;
//! use autocom::vocabulary::Vocabulary;
//!
//! let mut autocom = Autocom::new(
//!     Vocabulary::from_words(["select", "sample", "from"]),
//!     WordPatterns::default(),
//!     MatchConfig::default(),
//! );
//!
//! // The host reports its buffer after every edit
//! let state = autocom.on_buffer_changed("sel", 3, 3, true);
//! assert_eq!(state.suggestions().unwrap().candidates[0], "select");
//!
//! // Tab commits the highlighted suggestion
//! let outcome = autocom.on_key(SessionKey::Tab.into());
//! assert!(outcome.consumed);
//! assert_eq!(outcome.insertion.unwrap().text, "select");
//! ```

pub mod completion;
pub mod config;
pub mod error;
pub mod query_editor;
pub mod vocabulary;

pub use completion::Autocom;
pub use error::{AutocomError, AutocomResult};
