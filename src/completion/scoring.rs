//! Alignment scoring
//!
//! Scores how well the letters a user typed line up with a candidate, using a
//! modified longest-common-subsequence alignment. The alignment is
//! asymmetric: skipping typed letters is expensive, skipping candidate letters
//! is cheap, and matches near the start of the candidate are worth more.

use crate::config::{ConfigFingerprint, MatchConfig};
use std::collections::HashMap;
use std::sync::RwLock;

/// Whether a character has distinct upper and lower case forms
fn has_case(c: char) -> bool {
    !c.to_lowercase().eq(c.to_uppercase())
}

fn eq_ignore_case(a: char, b: char) -> bool {
    a.to_lowercase().eq(b.to_lowercase())
}

/// Score `prefix` against `candidate` (higher is better, may be negative)
///
/// Fills the `(i, j)` table bottom-up, where `table[i][j]` is the best score
/// for aligning `prefix[i..]` with `candidate[j..]`:
/// - when either side is exhausted, unconsumed prefix letters cost
///   `cost_skip_input_char` each and unconsumed candidate letters cost
///   `cost_skip_candidate_tail` each
/// - an exact match at candidate position `j` earns `1/sqrt(j+1)`
/// - a case-insensitive match earns half that
/// - otherwise the better of skipping a prefix letter (cheaper for special
///   characters) and skipping a candidate letter
pub fn score(prefix: &str, candidate: &str, config: &MatchConfig) -> f64 {
    let a: Vec<char> = prefix.chars().collect();
    let b: Vec<char> = candidate.chars().collect();
    let n = a.len();
    let m = b.len();

    let mut table = vec![vec![0.0f64; m + 1]; n + 1];

    for i in (0..=n).rev() {
        for j in (0..=m).rev() {
            if i == n || j == m {
                table[i][j] = -config.cost_skip_input_char * (n - i) as f64
                    - config.cost_skip_candidate_tail * (m - j) as f64;
                continue;
            }

            let weight = 1.0 / ((j + 1) as f64).sqrt();
            table[i][j] = if a[i] == b[j] {
                weight + table[i + 1][j + 1]
            } else if eq_ignore_case(a[i], b[j]) {
                0.5 * weight + table[i + 1][j + 1]
            } else {
                let skip_input = if has_case(a[i]) {
                    config.cost_skip_input_char
                } else {
                    config.cost_skip_special_input_char
                };
                let advance_i = table[i + 1][j] - skip_input;
                let advance_j = table[i][j + 1] - config.cost_skip_candidate_char;
                advance_i.max(advance_j)
            };
        }
    }

    table[0][0]
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScoreKey {
    prefix: String,
    candidate: String,
    config: ConfigFingerprint,
}

/// Memoized whole-call scores
///
/// The same prefix is scored against the same vocabulary over and over while
/// the user types and the popup re-renders, so results are kept keyed by
/// `(prefix, candidate, config)`. Unbounded: vocabularies and prefixes are
/// small. Safe to share between threads.
#[derive(Debug, Default)]
pub struct ScoreCache {
    entries: RwLock<HashMap<ScoreKey, f64>>,
}

impl ScoreCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached score, computing and storing it on a miss
    pub fn score(&self, prefix: &str, candidate: &str, config: &MatchConfig) -> f64 {
        let key = ScoreKey {
            prefix: prefix.to_string(),
            candidate: candidate.to_string(),
            config: config.fingerprint(),
        };

        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
        {
            return *hit;
        }

        let value = score(prefix, candidate, config);
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, value);
        value
    }

    /// Number of cached scores
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached score
    pub fn clear(&mut self) {
        self.entries
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_exact_prefix() {
        let config = MatchConfig::default();
        // f at j=0 (1.0) + o at j=1 (1/sqrt 2), tail cost 0
        let expected = 1.0 + 1.0 / 2f64.sqrt();
        assert!(approx(score("fo", "foo", &config), expected));
        assert!(approx(score("fo", "food", &config), expected));
    }

    #[test]
    fn test_case_insensitive_half_credit() {
        let config = MatchConfig::default();
        let exact = score("se", "select", &config);
        let upper = score("SE", "select", &config);
        assert!(approx(upper, exact / 2.0));
    }

    #[test]
    fn test_front_loaded_matches_score_higher() {
        let config = MatchConfig::default();
        assert!(score("m", "metrics", &config) > score("m", "sample", &config));
    }

    #[test]
    fn test_skipping_candidate_letters() {
        let config = MatchConfig::default();
        // s(0) skip e,l,e,c (4 x 0.25) t(5)
        let expected = 1.0 + 1.0 / 6f64.sqrt() - 4.0 * 0.25;
        assert!(approx(score("st", "select", &config), expected));
    }

    #[test]
    fn test_special_chars_are_cheap_to_skip() {
        let config = MatchConfig::default();
        let with_dot = score("a.s", "as", &config);
        let with_letter = score("axs", "as", &config);
        assert!(with_dot > with_letter);
        assert!(approx(with_dot, 1.0 + 1.0 / 2f64.sqrt() - 0.25));
    }

    #[test]
    fn test_tail_cost_prefers_shorter() {
        let config = MatchConfig::default().with_tail_cost(0.01);
        assert!(score("fo", "foo", &config) > score("fo", "food", &config));
    }

    #[test]
    fn test_empty_candidate() {
        let config = MatchConfig::default();
        assert!(approx(score("abc", "", &config), -6.0));
    }

    #[test]
    fn test_empty_prefix() {
        let config = MatchConfig::default().with_tail_cost(0.5);
        assert!(approx(score("", "abcd", &config), -2.0));
        assert!(approx(score("", "", &config), 0.0));
    }

    #[test]
    fn test_deterministic() {
        let config = MatchConfig::query_input();
        assert_eq!(
            score("rsl", "resolution", &config),
            score("rsl", "resolution", &config)
        );
    }

    #[test]
    fn test_self_score_is_maximal() {
        let config = MatchConfig::query_input();
        let own = score("sel", "sel", &config);
        for candidate in ["select", "selection", "seller", "sel.x"] {
            assert!(own >= score("sel", candidate, &config), "{}", candidate);
        }
    }

    #[test]
    fn test_non_ascii() {
        let config = MatchConfig::default();
        assert!(approx(score("É", "é", &config), 0.5));
    }

    #[test]
    fn test_cache_hits_and_clear() {
        let mut cache = ScoreCache::new();
        let config = MatchConfig::default();

        let first = cache.score("fo", "foo", &config);
        let second = cache.score("fo", "foo", &config);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        // Different config is a different entry
        cache.score("fo", "foo", &config.with_tail_cost(0.1));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cached_zero_score_is_reused() {
        let cache = ScoreCache::new();
        let config = MatchConfig::default();
        assert_eq!(cache.score("", "abc", &config), 0.0);
        assert_eq!(cache.score("", "abc", &config), 0.0);
        assert_eq!(cache.len(), 1);
    }
}
