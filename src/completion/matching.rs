//! Candidate ranking
//!
//! Scores a vocabulary against the typed prefix, sorts, and cuts the list by
//! threshold and count.

use super::scoring::ScoreCache;
use crate::config::MatchConfig;
use crate::vocabulary::Vocabulary;
use serde::Serialize;
use tracing::debug;

/// A candidate with its alignment score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub candidate: String,
    pub score: f64,
    /// Position in the vocabulary (tie-break for equal scores)
    pub index: usize,
}

/// Context-aware admission of candidates
///
/// Applied to the sorted list before it is cut down, so rejected candidates
/// don't take up suggestion slots.
pub trait RegionFilter {
    /// Whether `candidate` may be offered with this text around the caret
    fn admits(&self, before: &str, after: &str, candidate: &str) -> bool;
}

impl<F> RegionFilter for F
where
    F: Fn(&str, &str, &str) -> bool,
{
    fn admits(&self, before: &str, after: &str, candidate: &str) -> bool {
        self(before, after, candidate)
    }
}

lazy_static::lazy_static! {
    static ref CLAUSE_KEYWORD: regex::Regex =
        regex::Regex::new(r"\s(where|from|to|resolution|sample)\s").unwrap();
}

/// Keywords allowed once a query has reached its trailing clauses
pub const LATTER_KEYWORDS: &[&str] = &["from", "match", "now", "resolution", "sample", "by", "to"];

/// Restricts suggestions after a `where`/`from`/`to`/`resolution`/`sample`
/// clause to the keywords that can still follow
///
/// Works on plain text, so a clause keyword inside a quoted name also counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryClauseFilter;

impl RegionFilter for QueryClauseFilter {
    fn admits(&self, before: &str, _after: &str, candidate: &str) -> bool {
        if CLAUSE_KEYWORD.is_match(before) {
            return LATTER_KEYWORDS.contains(&candidate);
        }
        true
    }
}

/// Ranks vocabularies against prefixes, caching scores
///
/// Owns the score cache for its configuration; replacing the configuration
/// clears it.
#[derive(Debug, Default)]
pub struct Ranker {
    config: MatchConfig,
    cache: ScoreCache,
}

impl Ranker {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            cache: ScoreCache::new(),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Replace the configuration (clears the cache when it changes)
    pub fn set_config(&mut self, config: MatchConfig) {
        if config.fingerprint() != self.config.fingerprint() {
            self.cache.clear();
        }
        self.config = config;
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }

    /// Score every candidate and sort best first
    ///
    /// Equal scores keep vocabulary order, so repeated calls are reproducible.
    pub fn score_all(&self, prefix: &str, vocabulary: &Vocabulary) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = vocabulary
            .words()
            .iter()
            .enumerate()
            .map(|(index, word)| ScoredCandidate {
                candidate: word.clone(),
                score: self.cache.score(prefix, word, &self.config),
                index,
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
        scored
    }

    /// Ranked suggestions for `prefix`, or `None` when there is nothing
    /// useful to show
    pub fn rank(&self, prefix: &str, vocabulary: &Vocabulary) -> Option<Vec<String>> {
        self.rank_filtered(prefix, vocabulary, |_: &str| true)
    }

    /// Like [`Ranker::rank`], dropping candidates `admit` rejects before the
    /// list is cut to size
    pub fn rank_filtered<F>(
        &self,
        prefix: &str,
        vocabulary: &Vocabulary,
        admit: F,
    ) -> Option<Vec<String>>
    where
        F: Fn(&str) -> bool,
    {
        let scored = self.score_all(prefix, vocabulary);
        let limit = self.config.max_suggestions.unwrap_or(usize::MAX);

        let words: Vec<String> = scored
            .into_iter()
            .filter(|s| admit(&s.candidate))
            .take_while(|s| s.score >= self.config.threshold_score)
            .take(limit)
            .map(|s| s.candidate)
            .collect();

        if words.is_empty() {
            return None;
        }
        if words.len() == 1 && vocabulary.is_same_choice(prefix, &words[0]) {
            debug!("Only match for {:?} is already typed", prefix);
            return None;
        }
        debug!("{} suggestions for {:?}", words.len(), prefix);
        Some(words)
    }
}

/// Rank `vocabulary` against `prefix` with a throwaway cache
pub fn rank(prefix: &str, vocabulary: &Vocabulary, config: &MatchConfig) -> Option<Vec<String>> {
    Ranker::new(*config).rank(prefix, vocabulary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(words: &[&str]) -> Vocabulary {
        Vocabulary::from_words(words.iter().copied())
    }

    #[test]
    fn test_single_exact_match_is_none() {
        let result = rank("foo", &vocab(&["foo"]), &MatchConfig::default());
        assert_eq!(result, None);
    }

    #[test]
    fn test_prefix_overlap_outranks_unrelated() {
        let result = rank(
            "fo",
            &vocab(&["foo", "bar", "food"]),
            &MatchConfig::default(),
        )
        .unwrap();
        // Tie at zero tail cost keeps vocabulary order; "bar" falls below threshold
        assert_eq!(result, vec!["foo", "food"]);
    }

    #[test]
    fn test_tail_cost_decides_between_prefix_matches() {
        let config = MatchConfig::default().with_tail_cost(0.01);
        let result = rank("fo", &vocab(&["food", "bar", "foo"]), &config).unwrap();
        assert_eq!(result, vec!["foo", "food"]);
    }

    #[test]
    fn test_empty_vocabulary() {
        assert_eq!(rank("fo", &Vocabulary::new(), &MatchConfig::default()), None);
    }

    #[test]
    fn test_nothing_above_threshold() {
        assert_eq!(
            rank("zzz", &vocab(&["select", "from"]), &MatchConfig::default()),
            None
        );
    }

    #[test]
    fn test_max_suggestions() {
        let config = MatchConfig::default().with_max_suggestions(Some(2));
        let result = rank("s", &vocab(&["sa", "sb", "sc", "sd"]), &config).unwrap();
        assert_eq!(result, vec!["sa", "sb"]);
    }

    #[test]
    fn test_unlimited_suggestions() {
        let words: Vec<String> = (0..20).map(|i| format!("s{}", i)).collect();
        let vocabulary = Vocabulary::from_words(words);
        let config = MatchConfig::default().with_max_suggestions(None);
        assert_eq!(rank("s", &vocabulary, &config).unwrap().len(), 20);
    }

    #[test]
    fn test_threshold_cut_is_at_first_low_score() {
        let config = MatchConfig::default().with_threshold(1.5);
        // "sel" scores ~2.28 against select/selection, "s" alone reaches 1.0
        let result = rank("sel", &vocab(&["select", "sample", "selection"]), &config).unwrap();
        assert_eq!(result, vec!["select", "selection"]);
    }

    #[test]
    fn test_exact_match_with_others_is_kept() {
        let result = rank("to", &vocab(&["to", "total"]), &MatchConfig::default()).unwrap();
        assert_eq!(result[0], "to");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_tolerated_alias_counts_as_exact() {
        let vocabulary = Vocabulary::new().with_metrics(["cpu"]);
        assert_eq!(rank("`cpu`", &vocabulary, &MatchConfig::default()), None);
        assert_eq!(
            rank("`cp", &vocabulary, &MatchConfig::default()),
            Some(vec!["cpu".to_string()])
        );
    }

    #[test]
    fn test_ranking_is_stable() {
        let ranker = Ranker::new(MatchConfig::query_input());
        let vocabulary = Vocabulary::query_keywords();
        let first = ranker.rank("s", &vocabulary);
        let second = ranker.rank("s", &vocabulary);
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_all_sorted_with_index_tiebreak() {
        let ranker = Ranker::new(MatchConfig::default());
        let scored = ranker.score_all("fo", &vocab(&["food", "foo", "bar"]));
        assert_eq!(scored[0].candidate, "food");
        assert_eq!(scored[0].index, 0);
        assert_eq!(scored[1].candidate, "foo");
        assert_eq!(scored[2].candidate, "bar");
    }

    #[test]
    fn test_set_config_clears_cache() {
        let mut ranker = Ranker::new(MatchConfig::default());
        ranker.rank("fo", &vocab(&["foo", "food"]));
        assert_eq!(ranker.cache().len(), 2);

        ranker.set_config(MatchConfig::default());
        assert_eq!(ranker.cache().len(), 2);

        ranker.set_config(MatchConfig::query_input());
        assert!(ranker.cache().is_empty());
    }

    #[test]
    fn test_threshold_change_keeps_cache() {
        let mut ranker = Ranker::new(MatchConfig::default());
        let words = vocab(&["foo", "food"]);
        ranker.rank("fo", &words);
        assert_eq!(ranker.cache().len(), 2);

        ranker.set_config(MatchConfig::default().with_threshold(1.0).with_max_suggestions(Some(1)));
        assert_eq!(ranker.cache().len(), 2);

        // Cached scores are reused under the new cut
        assert_eq!(ranker.rank("fo", &words), Some(vec!["foo".to_string()]));
        assert_eq!(ranker.cache().len(), 2);
    }

    #[test]
    fn test_filter_frees_slots() {
        let ranker = Ranker::new(MatchConfig::default().with_max_suggestions(Some(2)));
        let result = ranker
            .rank_filtered("s", &vocab(&["sa", "sb", "sc"]), |c: &str| c != "sa")
            .unwrap();
        assert_eq!(result, vec!["sb", "sc"]);
    }

    #[test]
    fn test_query_clause_filter() {
        let filter = QueryClauseFilter;
        assert!(filter.admits("select ", "", "select"));
        assert!(!filter.admits("select cpu where ", "", "select"));
        assert!(filter.admits("select cpu where ", "", "from"));
        assert!(filter.admits("select cpu from -1h ", "", "to"));
    }

    #[test]
    fn test_closure_region_filter() {
        let only_short = |_: &str, _: &str, c: &str| c.len() <= 2;
        assert!(only_short.admits("", "", "by"));
        assert!(!only_short.admits("", "", "select"));
    }
}
