//! Committing a chosen candidate into the text buffer

use super::context::PrefixMatch;
use tracing::warn;

/// Buffer contents and caret after an insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// The whole buffer after replacement
    pub text: String,
    /// New caret byte offset, just after the inserted candidate
    pub caret: usize,
    /// The candidate that was inserted
    pub candidate: String,
}

/// Replace the prefix span of `buffer` with `candidate`
///
/// The caret lands at `prefix.from + candidate.len()`. A span that doesn't
/// fit the buffer (stale match) leaves the text untouched with the caret at
/// the end of the span.
///
/// ```
/// use autocom::completion::{insert_candidate, PrefixMatch};
///
/// let done = insert_candidate("select met", &PrefixMatch::new(7, "met"), "metric");
/// assert_eq!(done.text, "select metric");
/// assert_eq!(done.caret, 13);
/// ```
pub fn insert_candidate(buffer: &str, prefix: &PrefixMatch, candidate: &str) -> Insertion {
    match (buffer.get(..prefix.from), buffer.get(prefix.to..)) {
        (Some(head), Some(tail)) if prefix.from <= prefix.to => {
            let mut text = String::with_capacity(head.len() + candidate.len() + tail.len());
            text.push_str(head);
            text.push_str(candidate);
            text.push_str(tail);
            Insertion {
                text,
                caret: prefix.from + candidate.len(),
                candidate: candidate.to_string(),
            }
        }
        _ => {
            warn!(
                "Insertion span {}..{} does not fit buffer of {} bytes",
                prefix.from,
                prefix.to,
                buffer.len()
            );
            Insertion {
                text: buffer.to_string(),
                caret: prefix.to.min(buffer.len()),
                candidate: candidate.to_string(),
            }
        }
    }
}
