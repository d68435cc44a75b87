//! Polarity lexicon: word valences, negations, and boosters.
//!
//! The embedded lexicon targets general news vocabulary. Valences live in
//! [-1, 1]; boosters are multipliers applied to the next scored word;
//! negations flip the sign of the next scored word. An operator can override
//! the word valences with a plain-text file (`word valence` per line, `#`
//! comments), while negations and boosters stay embedded.

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

use super::EngineError;

/// Embedded word valences. Entries are base (lemmatized) forms where the
/// normalizer produces one.
const WORD_VALENCES: &[(&str, f64)] = &[
    // Positive
    ("good", 0.5),
    ("great", 0.65),
    ("excellent", 0.8),
    ("fantastic", 0.75),
    ("wonderful", 0.7),
    ("amazing", 0.7),
    ("awesome", 0.65),
    ("outstanding", 0.7),
    ("superb", 0.7),
    ("remarkable", 0.55),
    ("impressive", 0.55),
    ("positive", 0.5),
    ("best", 0.65),
    ("better", 0.45),
    ("love", 0.6),
    ("happy", 0.55),
    ("joy", 0.6),
    ("hope", 0.45),
    ("hopeful", 0.5),
    ("optimistic", 0.55),
    ("confident", 0.5),
    ("success", 0.6),
    ("successful", 0.6),
    ("win", 0.55),
    ("winner", 0.55),
    ("victory", 0.6),
    ("triumph", 0.65),
    ("achievement", 0.55),
    ("progress", 0.45),
    ("improve", 0.5),
    ("improved", 0.5),
    ("improvement", 0.5),
    ("recovery", 0.5),
    ("recover", 0.45),
    ("rebound", 0.45),
    ("boom", 0.55),
    ("growth", 0.5),
    ("grow", 0.45),
    ("gain", 0.5),
    ("rise", 0.4),
    ("rising", 0.4),
    ("surge", 0.5),
    ("soar", 0.55),
    ("rally", 0.45),
    ("strong", 0.45),
    ("stable", 0.35),
    ("safe", 0.4),
    ("benefit", 0.45),
    ("breakthrough", 0.6),
    ("celebrate", 0.55),
    ("praise", 0.5),
    ("support", 0.35),
    ("agreement", 0.35),
    ("peace", 0.55),
    ("well", 0.4),
    ("record", 0.35),
    ("profit", 0.5),
    ("thriving", 0.55),
    ("prosperity", 0.55),
    // Negative
    ("bad", -0.5),
    ("terrible", -0.7),
    ("awful", -0.7),
    ("horrible", -0.75),
    ("worst", -0.7),
    ("worse", -0.5),
    ("poor", -0.45),
    ("negative", -0.5),
    ("hate", -0.6),
    ("angry", -0.5),
    ("anger", -0.5),
    ("sad", -0.55),
    ("fear", -0.55),
    ("afraid", -0.5),
    ("worry", -0.45),
    ("worried", -0.45),
    ("concern", -0.4),
    ("anxious", -0.45),
    ("panic", -0.6),
    ("crisis", -0.65),
    ("disaster", -0.75),
    ("catastrophe", -0.8),
    ("collapse", -0.65),
    ("crash", -0.65),
    ("plunge", -0.55),
    ("fall", -0.4),
    ("falling", -0.4),
    ("drop", -0.4),
    ("decline", -0.45),
    ("loss", -0.5),
    ("lose", -0.45),
    ("fail", -0.55),
    ("failure", -0.6),
    ("failed", -0.55),
    ("weak", -0.4),
    ("slump", -0.5),
    ("recession", -0.6),
    ("unemployment", -0.5),
    ("debt", -0.4),
    ("fraud", -0.7),
    ("scandal", -0.6),
    ("corruption", -0.65),
    ("crime", -0.55),
    ("violence", -0.65),
    ("violent", -0.6),
    ("war", -0.65),
    ("conflict", -0.5),
    ("attack", -0.55),
    ("threat", -0.5),
    ("danger", -0.55),
    ("dangerous", -0.55),
    ("death", -0.65),
    ("dead", -0.6),
    ("die", -0.6),
    ("kill", -0.65),
    ("killed", -0.65),
    ("injured", -0.5),
    ("damage", -0.45),
    ("destroy", -0.6),
    ("destroyed", -0.6),
    ("ruin", -0.6),
    ("ruined", -0.6),
    ("problem", -0.4),
    ("trouble", -0.45),
    ("warning", -0.4),
    ("risk", -0.35),
    ("uncertainty", -0.4),
    ("volatile", -0.35),
    ("disappointing", -0.5),
    ("disappointment", -0.5),
    ("outrage", -0.6),
    ("protest", -0.35),
    ("ban", -0.35),
    ("shortage", -0.45),
    ("emergency", -0.5),
];

/// Booster multipliers applied to the next scored word.
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", 1.5),
    ("extremely", 1.6),
    ("incredibly", 1.5),
    ("hugely", 1.5),
    ("massively", 1.6),
    ("highly", 1.4),
    ("really", 1.3),
    ("totally", 1.3),
    ("deeply", 1.4),
    ("significantly", 1.4),
    ("sharply", 1.4),
    ("slightly", 0.6),
    ("somewhat", 0.7),
    ("marginally", 0.5),
    ("barely", 0.5),
    ("mildly", 0.7),
];

/// Negation markers flipping the sign of the next scored word. The apostrophe
/// forms are listed without apostrophes to match normalized text; most of the
/// short function-word negations are also stopwords, so these mainly matter
/// when the engine is run over raw text.
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nobody", "nothing", "nowhere", "none", "cannot", "cant",
    "without", "hardly", "scarcely", "dont", "doesnt", "didnt", "wont", "wouldnt", "shouldnt",
    "couldnt", "isnt", "arent", "wasnt", "werent", "aint",
];

#[derive(Debug, Clone)]
pub struct PolarityLexicon {
    valences: FxHashMap<String, f64>,
    boosters: FxHashMap<&'static str, f64>,
    negations: FxHashSet<&'static str>,
}

impl PolarityLexicon {
    /// Build the lexicon from the embedded word list.
    #[must_use]
    pub fn embedded() -> Self {
        let valences = WORD_VALENCES
            .iter()
            .map(|(word, valence)| ((*word).to_string(), *valence))
            .collect();
        Self {
            valences,
            boosters: BOOSTERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        }
    }

    /// Load word valences from a plain-text override file.
    ///
    /// Each non-empty, non-`#` line holds `word valence`. Valences are
    /// clamped to [-1, 1]. Boosters and negations stay embedded.
    ///
    /// # Errors
    /// Returns [`EngineError::LexiconLoad`] when the file cannot be read and
    /// [`EngineError::LexiconParse`] on a malformed line.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| EngineError::LexiconLoad {
            path: display.clone(),
            source,
        })?;

        let mut valences = FxHashMap::default();
        for (index, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parse_error = || EngineError::LexiconParse {
                path: display.clone(),
                line: index + 1,
            };
            let (word, valence) = line.split_once(char::is_whitespace).ok_or_else(parse_error)?;
            let valence: f64 = valence.trim().parse().map_err(|_| parse_error())?;
            valences.insert(word.to_lowercase(), valence.clamp(-1.0, 1.0));
        }

        Ok(Self {
            valences,
            boosters: BOOSTERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.valences.len()
    }

    #[must_use]
    pub fn valence(&self, token: &str) -> Option<f64> {
        self.valences.get(token).copied()
    }

    #[must_use]
    pub fn booster(&self, token: &str) -> Option<f64> {
        self.boosters.get(token).copied()
    }

    #[must_use]
    pub fn is_negation(&self, token: &str) -> bool {
        self.negations.contains(token)
    }
}
