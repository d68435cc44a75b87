//! Text normalization for polarity scoring.
//!
//! Pipeline order is fixed: lowercase, strip punctuation, tokenize on word
//! boundaries, drop stopwords, lemmatize surviving tokens, rejoin with single
//! spaces. The whole pass is deterministic and idempotent on its own output.

use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use super::stopwords;
use crate::util::text::join_tokens;

/// Irregular noun plurals the suffix rules cannot reach.
static IRREGULAR_NOUNS: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("mice", "mouse"),
        ("oxen", "ox"),
        ("wolves", "wolf"),
        ("knives", "knife"),
        ("lives", "life"),
        ("leaves", "leaf"),
        ("wives", "wife"),
        ("halves", "half"),
    ]
    .into_iter()
    .collect()
});

/// Tokens that look plural but are their own base form.
static PLURAL_EXCEPTIONS: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| ["news", "series", "species"].into_iter().collect());

#[derive(Debug)]
pub struct TextNormalizer {
    stopwords: FxHashSet<&'static str>,
}

impl TextNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stopwords: stopwords::ENGLISH.iter().copied().collect(),
        }
    }

    /// Normalize raw text into a lowercase, punctuation-free, stopword-free,
    /// lemmatized token string.
    ///
    /// Empty input and all-stopword input both yield an empty string.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.nfc().collect::<String>().to_lowercase();
        let stripped: String = lowered
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();

        let tokens: Vec<String> = stripped
            .unicode_words()
            .filter(|token| !self.stopwords.contains(*token))
            .map(|token| lemmatize(token).unwrap_or_else(|| token.to_string()))
            .collect();

        join_tokens(&tokens)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reduce a token to its base noun form.
///
/// Returns `None` when no rule applies; the caller falls back to the original
/// token unchanged, so lemmatization is total and never drops a token. Rules
/// are chosen so a lemma never matches another rule, keeping normalization
/// idempotent.
#[must_use]
pub fn lemmatize(token: &str) -> Option<String> {
    if let Some(base) = IRREGULAR_NOUNS.get(token) {
        return Some((*base).to_string());
    }

    if PLURAL_EXCEPTIONS.contains(token) {
        return None;
    }

    // cities -> city
    if let Some(stem) = token.strip_suffix("ies")
        && stem.len() >= 2
    {
        return Some(format!("{stem}y"));
    }

    // boxes -> box, churches -> church, heroes -> hero
    if let Some(stem) = token.strip_suffix("es")
        && (stem.ends_with("ch")
            || stem.ends_with("sh")
            || stem.ends_with("ss")
            || stem.ends_with('x')
            || stem.ends_with('z')
            || stem.ends_with('o'))
    {
        return Some(stem.to_string());
    }

    // markets -> market; -ss/-us/-is endings are left alone
    if token.len() > 3
        && let Some(stem) = token.strip_suffix('s')
        && !stem.ends_with('s')
        && !stem.ends_with('u')
        && !stem.ends_with('i')
    {
        return Some(stem.to_string());
    }

    None
}
