//! Rule-based polarity engine.
//!
//! Scores normalized text by summing word valences with negation flipping and
//! booster scaling, then squashing the sum into a compound score in [-1, 1].

use super::{EngineError, PolarityLexicon, SentimentLabel, SentimentResult, TextNormalizer};

/// Normalization constant for the compound squash `sum / sqrt(sum^2 + ALPHA)`.
const ALPHA: f64 = 15.0;

/// Sub-scores alongside the compound: proportions of positive, negative and
/// neutral token mass in the scored text. Each lies in [0, 1]; for non-empty
/// scored text they sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarityScores {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub compound: f64,
}

impl PolarityScores {
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            positive: 0.0,
            negative: 0.0,
            neutral: 0.0,
            compound: 0.0,
        }
    }
}

/// Lexicon/rule sentiment engine.
///
/// Holds the normalizer and the polarity lexicon; built once at startup and
/// shared read-only across requests.
#[derive(Debug)]
pub struct SentimentEngine {
    normalizer: TextNormalizer,
    lexicon: PolarityLexicon,
    positive_threshold: f64,
    negative_threshold: f64,
}

impl SentimentEngine {
    /// Build an engine over the given lexicon.
    ///
    /// # Errors
    /// Returns [`EngineError::EmptyLexicon`] when the lexicon holds no
    /// entries; an engine without valences cannot score anything.
    pub fn new(
        lexicon: PolarityLexicon,
        positive_threshold: f64,
        negative_threshold: f64,
    ) -> Result<Self, EngineError> {
        if lexicon.is_empty() {
            return Err(EngineError::EmptyLexicon);
        }

        Ok(Self {
            normalizer: TextNormalizer::new(),
            lexicon,
            positive_threshold,
            negative_threshold,
        })
    }

    /// Build an engine over the embedded lexicon with the default ±0.05
    /// thresholds.
    ///
    /// # Errors
    /// Propagates [`EngineError`] from [`Self::new`].
    pub fn with_embedded_lexicon() -> Result<Self, EngineError> {
        Self::new(PolarityLexicon::embedded(), 0.05, -0.05)
    }

    /// Normalize `text` and score it.
    ///
    /// Empty or all-stopword input yields compound 0.0 and Neutral. A
    /// non-finite engine result is coerced to 0.0/Neutral as well.
    ///
    /// # Errors
    /// Returns [`EngineError::EmptyLexicon`] when the engine's lexicon has
    /// become unusable; the caller decides whether to skip the article or
    /// fail the batch.
    pub fn score(&self, text: &str) -> Result<SentimentResult, EngineError> {
        if self.lexicon.is_empty() {
            return Err(EngineError::EmptyLexicon);
        }

        let normalized = self.normalizer.normalize(text);
        if normalized.is_empty() {
            return Ok(SentimentResult::neutral());
        }

        let scores = self.polarity_scores(&normalized);
        if !scores.compound.is_finite() {
            return Ok(SentimentResult::neutral());
        }

        Ok(SentimentResult {
            compound: scores.compound,
            label: SentimentLabel::from_compound(
                scores.compound,
                self.positive_threshold,
                self.negative_threshold,
            ),
        })
    }

    /// Score already-normalized text.
    ///
    /// Walks tokens in order: a negation marker flips the sign of the next
    /// scored word, a booster scales it, and any unscored word resets both
    /// modifiers.
    #[must_use]
    pub fn polarity_scores(&self, normalized: &str) -> PolarityScores {
        let mut valences: Vec<f64> = Vec::new();
        let mut neutral_count = 0usize;
        let mut negate_next = false;
        let mut booster = 1.0;

        for token in normalized.split_whitespace() {
            if self.lexicon.is_negation(token) {
                negate_next = true;
                continue;
            }

            if let Some(multiplier) = self.lexicon.booster(token) {
                booster *= multiplier;
                continue;
            }

            if let Some(valence) = self.lexicon.valence(token) {
                let mut scored = valence;
                if negate_next {
                    scored = -scored;
                    negate_next = false;
                }
                scored *= booster;
                booster = 1.0;
                valences.push(scored.clamp(-1.0, 1.0));
            } else {
                neutral_count += 1;
                negate_next = false;
                booster = 1.0;
            }
        }

        let sum: f64 = valences.iter().sum();
        let compound = (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0);

        let positive: f64 = valences.iter().filter(|v| **v > 0.0).sum();
        let negative: f64 = valences.iter().filter(|v| **v < 0.0).map(|v| v.abs()).sum();
        #[allow(clippy::cast_precision_loss)]
        let neutral = neutral_count as f64;
        let total = positive + negative + neutral;

        if total <= 0.0 {
            return PolarityScores::zero();
        }

        PolarityScores {
            positive: positive / total,
            negative: negative / total,
            neutral: neutral / total,
            compound,
        }
    }
}
