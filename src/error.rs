//! Error types
//!
//! The matcher itself never fails (it degrades to "no suggestions"); errors
//! only come from the ambient layer: compiling word patterns and loading
//! configuration or vocabulary files.

use std::fmt;

/// Which of the two word patterns failed to compile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Pattern matched against the text before the caret
    Prefix,
    /// Pattern matched against the text after the caret
    Continue,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Prefix => write!(f, "prefix"),
            PatternKind::Continue => write!(f, "continue"),
        }
    }
}

/// Autocom error types
#[derive(Debug)]
pub enum AutocomError {
    /// IO error while reading a config or vocabulary file
    Io(std::io::Error),
    /// Config file is not valid TOML for the expected schema
    Config(toml::de::Error),
    /// A word pattern is not a valid regular expression
    Pattern {
        which: PatternKind,
        source: regex::Error,
    },
    /// Config parsed but holds values the matcher can't use
    InvalidConfig(String),
    /// Vocabulary file could not be interpreted
    Vocabulary(String),
}

impl fmt::Display for AutocomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutocomError::Io(e) => write!(f, "IO error: {}", e),
            AutocomError::Config(e) => write!(f, "Config error: {}", e),
            AutocomError::Pattern { which, source } => {
                write!(f, "Invalid {} pattern: {}", which, source)
            }
            AutocomError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            AutocomError::Vocabulary(msg) => write!(f, "Vocabulary error: {}", msg),
        }
    }
}

impl std::error::Error for AutocomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AutocomError::Io(e) => Some(e),
            AutocomError::Config(e) => Some(e),
            AutocomError::Pattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AutocomError {
    fn from(e: std::io::Error) -> Self {
        AutocomError::Io(e)
    }
}

impl From<toml::de::Error> for AutocomError {
    fn from(e: toml::de::Error) -> Self {
        AutocomError::Config(e)
    }
}

/// Result type for autocom operations
pub type AutocomResult<T> = Result<T, AutocomError>;
