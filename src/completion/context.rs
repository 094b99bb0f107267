//! Prefix detection
//!
//! Decides from the buffer and caret whether autocompletion should trigger,
//! and which span of text before the caret is the word being typed.

use crate::error::{AutocomError, AutocomResult, PatternKind};
use regex::Regex;
use serde::Serialize;

/// Default word pattern: one or more ASCII letters
pub const DEFAULT_WORD_PATTERN: &str = "[A-Za-z]+";

/// Query-language identifiers: dotted/dashed names, optionally backtick-quoted
pub const QUERY_PREFIX_PATTERN: &str = "`[a-zA-Z_][a-zA-Z._-]*`?|[a-zA-Z_][a-zA-Z._-]*";

/// Characters that continue a query-language identifier
pub const QUERY_CONTINUE_PATTERN: &str = "[a-zA-Z_`.-]";

/// The in-progress word before the caret
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixMatch {
    /// Byte offset where the word starts
    pub from: usize,
    /// Byte offset of the caret (end of the word)
    pub to: usize,
    /// The word itself, `buffer[from..to]`
    pub text: String,
}

impl PrefixMatch {
    pub fn new(from: usize, text: &str) -> Self {
        Self {
            from,
            to: from + text.len(),
            text: text.to_string(),
        }
    }
}

/// Compiled prefix and continuation patterns
///
/// The prefix pattern is matched anchored at the end of the text before the
/// caret; the continue pattern is matched anchored at the start of the text
/// after it. Only whether the continue pattern matches matters, so matching a
/// single character is enough.
#[derive(Debug, Clone)]
pub struct WordPatterns {
    prefix: Regex,
    continuation: Regex,
    prefix_source: String,
    continue_source: String,
}

impl WordPatterns {
    /// Compile a pattern pair
    pub fn new(prefix: &str, continuation: &str) -> AutocomResult<Self> {
        let prefix_re =
            Regex::new(&format!("(?:{})$", prefix)).map_err(|source| AutocomError::Pattern {
                which: PatternKind::Prefix,
                source,
            })?;
        let continue_re = Regex::new(&format!("^(?:{})", continuation)).map_err(|source| {
            AutocomError::Pattern {
                which: PatternKind::Continue,
                source,
            }
        })?;
        Ok(Self {
            prefix: prefix_re,
            continuation: continue_re,
            prefix_source: prefix.to_string(),
            continue_source: continuation.to_string(),
        })
    }

    /// Patterns for the query input (identifiers with `.`, `-`, `_` and
    /// backtick-quoted names)
    pub fn query_language() -> Self {
        QUERY_PATTERNS.clone()
    }

    pub fn prefix_source(&self) -> &str {
        &self.prefix_source
    }

    pub fn continue_source(&self) -> &str {
        &self.continue_source
    }
}

impl Default for WordPatterns {
    fn default() -> Self {
        DEFAULT_PATTERNS.clone()
    }
}

lazy_static::lazy_static! {
    static ref DEFAULT_PATTERNS: WordPatterns = WordPatterns {
        prefix: Regex::new(&format!("(?:{})$", DEFAULT_WORD_PATTERN)).unwrap(),
        continuation: Regex::new(&format!("^(?:{})", DEFAULT_WORD_PATTERN)).unwrap(),
        prefix_source: DEFAULT_WORD_PATTERN.to_string(),
        continue_source: DEFAULT_WORD_PATTERN.to_string(),
    };
    static ref QUERY_PATTERNS: WordPatterns = WordPatterns {
        prefix: Regex::new(&format!("(?:{})$", QUERY_PREFIX_PATTERN)).unwrap(),
        continuation: Regex::new(&format!("^(?:{})", QUERY_CONTINUE_PATTERN)).unwrap(),
        prefix_source: QUERY_PREFIX_PATTERN.to_string(),
        continue_source: QUERY_CONTINUE_PATTERN.to_string(),
    };
}

/// Detect the word being typed at the caret
///
/// Returns `None` when:
/// - the selection is a range (`cursor_start != cursor_end`)
/// - the caret is outside the buffer or not on a character boundary
/// - the text after the caret continues a word (caret is mid-word)
/// - nothing before the caret matches the prefix pattern, or the match is empty
///
/// # Examples
///
/// ```
/// use autocom::completion::{detect_prefix, WordPatterns};
///
/// let patterns = WordPatterns::default();
/// let found = detect_prefix("sel", 3, 3, &patterns).unwrap();
/// assert_eq!((found.from, found.to, found.text.as_str()), (0, 3, "sel"));
///
/// assert!(detect_prefix("select ", 7, 7, &patterns).is_none());
/// ```
pub fn detect_prefix(
    buffer: &str,
    cursor_start: usize,
    cursor_end: usize,
    patterns: &WordPatterns,
) -> Option<PrefixMatch> {
    if cursor_start != cursor_end {
        return None;
    }
    let caret = cursor_start;
    if !buffer.is_char_boundary(caret) {
        return None;
    }

    let (before, after) = buffer.split_at(caret);

    if patterns.continuation.is_match(after) {
        // Caret sits inside or right before a word
        return None;
    }

    let found = patterns.prefix.find(before)?;
    if found.as_str().is_empty() {
        return None;
    }

    Some(PrefixMatch::new(found.start(), found.as_str()))
}
