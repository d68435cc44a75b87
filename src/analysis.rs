//! Lexicon/rule-based sentiment analysis.
//!
//! The analysis layer owns the text normalizer (lowercasing, punctuation
//! removal, tokenization, stopword filtering, lemmatization) and the polarity
//! engine that turns normalized text into a compound score in [-1, 1] with a
//! discrete label. Lexicon and stopword state are loaded once at startup and
//! shared read-only for the process lifetime.

pub mod engine;
pub mod lexicon;
pub mod normalizer;
pub(crate) mod stopwords;

use serde::Serialize;
use thiserror::Error;

pub use engine::{PolarityScores, SentimentEngine};
pub use lexicon::PolarityLexicon;
pub use normalizer::TextNormalizer;

/// Discrete sentiment classification of a compound score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Classify a compound score against the per-article thresholds.
    ///
    /// The label is a pure function of the score: `compound >= positive`
    /// yields Positive, `compound <= negative` yields Negative, anything in
    /// between is Neutral.
    #[must_use]
    pub fn from_compound(compound: f64, positive_threshold: f64, negative_threshold: f64) -> Self {
        if compound >= positive_threshold {
            Self::Positive
        } else if compound <= negative_threshold {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compound score plus its derived label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentResult {
    /// Aggregate polarity in [-1, 1].
    pub compound: f64,
    /// Label derived from `compound` via [`SentimentLabel::from_compound`].
    pub label: SentimentLabel,
}

impl SentimentResult {
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            compound: 0.0,
            label: SentimentLabel::Neutral,
        }
    }
}

/// Failures of the polarity engine itself.
///
/// These surface to the caller; there is no silent in-core fallback for an
/// unusable engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("sentiment lexicon holds no entries")]
    EmptyLexicon,
    #[error("failed to read lexicon file {path}")]
    LexiconLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed lexicon entry at {path}:{line}")]
    LexiconParse { path: String, line: usize },
}
