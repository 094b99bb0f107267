//! Integration tests for scoring and ranking through the public API

use autocom::completion::{detect_prefix, insert_candidate, rank, score, Ranker, WordPatterns};
use autocom::config::{CompleterConfig, MatchConfig};
use autocom::vocabulary::Vocabulary;
use std::io::Write;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_prefix_of_both_scores_equal_without_tail_cost() {
    let config = MatchConfig::default();
    let expected = 1.0 + 1.0 / 2f64.sqrt();
    assert!(approx(score("fo", "foo", &config), expected));
    assert!(approx(score("fo", "food", &config), expected));

    let vocabulary = Vocabulary::from_words(["bar", "foo", "food"]);
    assert_eq!(
        rank("fo", &vocabulary, &config),
        Some(vec!["foo".to_string(), "food".to_string()])
    );
}

#[test]
fn test_tail_cost_orders_by_length() {
    let config = MatchConfig::default().with_tail_cost(0.01);
    let vocabulary = Vocabulary::from_words(["food", "foo"]);
    assert_eq!(
        rank("fo", &vocabulary, &config),
        Some(vec!["foo".to_string(), "food".to_string()])
    );
}

#[test]
fn test_nothing_above_threshold() {
    let vocabulary = Vocabulary::from_words(["select", "sample"]);
    assert_eq!(rank("zzz", &vocabulary, &MatchConfig::default()), None);
}

#[test]
fn test_exact_sole_match_offers_nothing() {
    let vocabulary = Vocabulary::from_words(["select", "from"]);
    assert_eq!(rank("select", &vocabulary, &MatchConfig::default()), None);
}

#[test]
fn test_max_suggestions_caps_list() {
    let vocabulary = Vocabulary::from_words(["aa", "ab", "ac", "ad"]);
    let config = MatchConfig::default().with_max_suggestions(Some(2));
    assert_eq!(rank("a", &vocabulary, &config).unwrap().len(), 2);

    let unlimited = MatchConfig::default().with_max_suggestions(None);
    assert_eq!(rank("a", &vocabulary, &unlimited).unwrap().len(), 4);
}

#[test]
fn test_ranker_reuses_cache_across_calls() {
    let vocabulary = Vocabulary::query_keywords();
    let ranker = Ranker::new(MatchConfig::query_input());

    let first = ranker.rank("re", &vocabulary);
    let cached = ranker.cache().len();
    let second = ranker.rank("re", &vocabulary);

    assert_eq!(first, second);
    assert_eq!(ranker.cache().len(), cached);
    assert_eq!(first.unwrap()[0], "resolution");
}

#[test]
fn test_word_list_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# metric names").unwrap();
    writeln!(file, "cpu.load").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "cpu.idle").unwrap();

    let vocabulary = Vocabulary::load_word_list(file.path()).unwrap();
    assert_eq!(vocabulary.len(), 2);

    let ranked = rank("cpui", &vocabulary, &MatchConfig::query_input()).unwrap();
    assert_eq!(ranked[0], "cpu.idle");
}

#[test]
fn test_config_file_drives_pipeline() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[matching]
max_suggestions = 3

[patterns]
prefix = "[a-z]+"
continue = "[a-z]"

[vocabulary]
keywords = ["alpha", "alps", "altitude", "beta"]
"#
    )
    .unwrap();

    let config = CompleterConfig::load(file.path()).unwrap();
    assert_eq!(config.matching.max_suggestions, Some(3));
    let patterns = config.word_patterns().unwrap();
    let vocabulary = config.vocabulary();

    let buffer = "go al";
    let prefix = detect_prefix(buffer, buffer.len(), buffer.len(), &patterns).unwrap();
    assert_eq!(prefix.text, "al");

    // Unset matching fields take the plain defaults (no tail cost): a tie
    let ranked = rank(&prefix.text, &vocabulary, &config.matching).unwrap();
    assert_eq!(ranked, vec!["alpha", "alps", "altitude"]);

    let done = insert_candidate(buffer, &prefix, &ranked[1]);
    assert_eq!(done.text, "go alps");
    assert_eq!(done.caret, 7);
}

#[test]
fn test_default_patterns_stop_at_punctuation() {
    let patterns = WordPatterns::default();
    let found = detect_prefix("f(x).ma", 7, 7, &patterns).unwrap();
    assert_eq!(found.from, 5);
    assert_eq!(found.text, "ma");
}
