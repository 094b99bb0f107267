//! Candidate vocabulary
//!
//! Ordered, de-duplicated candidate strings: query keywords, function names
//! and metric names. Metric names that the query lexer can't read bare are
//! backtick-quoted before they become candidates; bare ones additionally
//! register their quoted spelling as a tolerated alias.

use crate::error::{AutocomError, AutocomResult};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

lazy_static::lazy_static! {
    /// Keywords of the query language, offered everywhere
    pub static ref QUERY_KEYWORDS: Vec<&'static str> = vec![
        "all", "by", "collapse", "describe", "from", "group", "match", "metrics",
        "now", "resolution", "sample", "select", "to", "where",
    ];
}

/// Candidate list with tolerated aliases
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    words: Vec<String>,
    seen: HashSet<String>,
    /// alias -> candidate it stands for
    tolerated: HashMap<String, String>,
}

impl Vocabulary {
    /// Create an empty vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Vocabulary holding exactly `words` (duplicates dropped, order kept)
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = Self::new();
        for word in words {
            vocabulary.push(word.into());
        }
        vocabulary
    }

    /// The built-in query keywords
    pub fn query_keywords() -> Self {
        Self::from_words(QUERY_KEYWORDS.iter().copied())
    }

    /// Append function names
    pub fn with_functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.push(name.into());
        }
        self
    }

    /// Append metric names, quoting those that need it
    pub fn with_metrics<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if needs_quoting(&name) {
                self.push(quote(&name));
            } else {
                self.tolerated.insert(quote(&name), name.clone());
                self.push(name);
            }
        }
        self
    }

    /// Read a plain word list: one candidate per line, blank lines and `#`
    /// comments skipped. Entries are added as-is.
    pub fn load_word_list(path: &Path) -> AutocomResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let vocabulary = Self::parse_word_list(&content)?;
        debug!(
            "Loaded {} candidates from {}",
            vocabulary.len(),
            path.display()
        );
        Ok(vocabulary)
    }

    /// Parse word list content (see [`Vocabulary::load_word_list`])
    pub fn parse_word_list(content: &str) -> AutocomResult<Self> {
        let mut vocabulary = Self::new();
        for (line_no, line) in content.lines().enumerate() {
            let word = line.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }
            if word.chars().any(char::is_whitespace) {
                return Err(AutocomError::Vocabulary(format!(
                    "line {}: candidate {:?} contains whitespace",
                    line_no + 1,
                    word
                )));
            }
            vocabulary.push(word.to_string());
        }
        Ok(vocabulary)
    }

    fn push(&mut self, word: String) {
        if self.seen.insert(word.clone()) {
            self.words.push(word);
        }
    }

    /// Candidates in insertion order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.seen.contains(word)
    }

    /// Candidate that `text` is an accepted alternate spelling of
    pub fn tolerated_alias(&self, text: &str) -> Option<&str> {
        self.tolerated.get(text).map(String::as_str)
    }

    /// Whether typing `typed` already amounts to choosing `candidate`
    pub fn is_same_choice(&self, typed: &str, candidate: &str) -> bool {
        typed == candidate || self.tolerated_alias(typed) == Some(candidate)
    }
}

fn needs_quoting(name: &str) -> bool {
    name.contains('-')
}

fn quote(name: &str) -> String {
    format!("`{}`", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_keywords() {
        let vocabulary = Vocabulary::query_keywords();
        assert_eq!(vocabulary.len(), 14);
        assert_eq!(vocabulary.words()[0], "all");
        assert!(vocabulary.contains("where"));
    }

    #[test]
    fn test_duplicates_dropped_in_order() {
        let vocabulary = Vocabulary::from_words(["to", "from", "to"]);
        assert_eq!(vocabulary.words(), &["to".to_string(), "from".to_string()]);
    }

    #[test]
    fn test_metrics_with_dash_are_quoted() {
        let vocabulary = Vocabulary::new().with_metrics(["disk-usage", "cpu.load"]);
        assert_eq!(
            vocabulary.words(),
            &["`disk-usage`".to_string(), "cpu.load".to_string()]
        );
        assert_eq!(vocabulary.tolerated_alias("`cpu.load`"), Some("cpu.load"));
        assert_eq!(vocabulary.tolerated_alias("`disk-usage`"), None);
    }

    #[test]
    fn test_same_choice() {
        let vocabulary = Vocabulary::new().with_metrics(["cpu"]);
        assert!(vocabulary.is_same_choice("cpu", "cpu"));
        assert!(vocabulary.is_same_choice("`cpu`", "cpu"));
        assert!(!vocabulary.is_same_choice("cp", "cpu"));
    }

    #[test]
    fn test_parse_word_list() {
        let vocabulary =
            Vocabulary::parse_word_list("# functions\ntransform.rate\n\n  aggregate.sum  \n")
                .unwrap();
        assert_eq!(
            vocabulary.words(),
            &["transform.rate".to_string(), "aggregate.sum".to_string()]
        );
    }

    #[test]
    fn test_parse_word_list_rejects_spaces() {
        let result = Vocabulary::parse_word_list("ok\nnot ok\n");
        assert!(matches!(result, Err(AutocomError::Vocabulary(_))));
    }
}
