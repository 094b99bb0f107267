//! Configuration
//!
//! Matching tunables plus the TOML file format used by the CLI and the
//! terminal editor:
//!
//! ```toml
//! [matching]
//! threshold_score = 0.0
//! cost_skip_candidate_char = 0.05
//! max_suggestions = 8
//!
//! [patterns]
//! prefix = "[a-z]+"
//! continue = "[a-z]"
//!
//! [vocabulary]
//! functions = ["transform.derivative", "aggregate.sum"]
//! metrics = ["cpu.load", "disk-usage"]
//! ```

use crate::completion::WordPatterns;
use crate::error::{AutocomError, AutocomResult};
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Numeric tunables for scoring and ranking
///
/// Immutable for the lifetime of a session; changing it through the ranker
/// clears the score cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Candidates scoring below this are not shown
    pub threshold_score: f64,
    /// Penalty for skipping a letter of the typed prefix
    pub cost_skip_input_char: f64,
    /// Penalty for skipping a special character (no upper/lower case form) of the prefix
    pub cost_skip_special_input_char: f64,
    /// Penalty for skipping a character of the candidate before the prefix is consumed
    pub cost_skip_candidate_char: f64,
    /// Penalty per unconsumed candidate character once the prefix runs out
    pub cost_skip_candidate_tail: f64,
    /// Maximum number of suggestions shown (`None` = unlimited)
    pub max_suggestions: Option<usize>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold_score: 0.0,
            cost_skip_input_char: 2.0,
            cost_skip_special_input_char: 0.25,
            cost_skip_candidate_char: 0.25,
            cost_skip_candidate_tail: 0.0,
            max_suggestions: Some(8),
        }
    }
}

impl MatchConfig {
    /// Tuning used for the query input: skipping candidate letters is 5x
    /// cheaper, and a small tail cost prefers shorter candidates.
    pub fn query_input() -> Self {
        Self {
            cost_skip_candidate_char: 0.05,
            cost_skip_candidate_tail: 0.01,
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold_score = threshold;
        self
    }

    pub fn with_max_suggestions(mut self, max: Option<usize>) -> Self {
        self.max_suggestions = max;
        self
    }

    pub fn with_tail_cost(mut self, cost: f64) -> Self {
        self.cost_skip_candidate_tail = cost;
        self
    }

    /// Check that every tunable is usable by the scorer
    pub fn validate(&self) -> AutocomResult<()> {
        let costs = [
            ("cost_skip_input_char", self.cost_skip_input_char),
            ("cost_skip_special_input_char", self.cost_skip_special_input_char),
            ("cost_skip_candidate_char", self.cost_skip_candidate_char),
            ("cost_skip_candidate_tail", self.cost_skip_candidate_tail),
        ];
        for (name, value) in costs {
            if !value.is_finite() || value < 0.0 {
                return Err(AutocomError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !self.threshold_score.is_finite() {
            return Err(AutocomError::InvalidConfig(format!(
                "threshold_score must be finite, got {}",
                self.threshold_score
            )));
        }
        if self.max_suggestions == Some(0) {
            return Err(AutocomError::InvalidConfig(
                "max_suggestions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Identity of the costs that shape a score, usable as a cache key
    /// component; threshold and suggestion cap only cut the ranked list
    pub fn fingerprint(&self) -> ConfigFingerprint {
        ConfigFingerprint([
            self.cost_skip_input_char.to_bits(),
            self.cost_skip_special_input_char.to_bits(),
            self.cost_skip_candidate_char.to_bits(),
            self.cost_skip_candidate_tail.to_bits(),
        ])
    }
}

/// Bitwise identity of a [`MatchConfig`]'s costs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigFingerprint([u64; 4]);

/// `[patterns]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub prefix: Option<String>,
    #[serde(rename = "continue")]
    pub continue_pattern: Option<String>,
}

/// `[vocabulary]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Replaces the built-in query keywords when present
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
}

/// Complete autocompletion setup as read from a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleterConfig {
    #[serde(default = "MatchConfig::query_input")]
    pub matching: MatchConfig,
    #[serde(default)]
    pub patterns: PatternConfig,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
}

impl Default for CompleterConfig {
    fn default() -> Self {
        Self {
            matching: MatchConfig::query_input(),
            patterns: PatternConfig::default(),
            vocabulary: VocabularyConfig::default(),
        }
    }
}

impl CompleterConfig {
    /// Default location: `<config dir>/autocom/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("autocom").join("config.toml"))
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> AutocomResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        info!("Loaded autocomplete config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, else from the default location if it
    /// exists, else fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> AutocomResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Parse from TOML content
    pub fn parse(content: &str) -> AutocomResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.matching.validate()?;
        Ok(config)
    }

    /// Compile the configured patterns, defaulting to the query-language ones
    pub fn word_patterns(&self) -> AutocomResult<WordPatterns> {
        let defaults = WordPatterns::query_language();
        let prefix = self
            .patterns
            .prefix
            .as_deref()
            .unwrap_or(defaults.prefix_source());
        let cont = self
            .patterns
            .continue_pattern
            .as_deref()
            .unwrap_or(defaults.continue_source());
        WordPatterns::new(prefix, cont)
    }

    /// Build the candidate vocabulary
    pub fn vocabulary(&self) -> Vocabulary {
        let base = match &self.vocabulary.keywords {
            Some(keywords) => Vocabulary::from_words(keywords.iter().cloned()),
            None => Vocabulary::query_keywords(),
        };
        base.with_functions(self.vocabulary.functions.iter().cloned())
            .with_metrics(self.vocabulary.metrics.iter().cloned())
    }
}
