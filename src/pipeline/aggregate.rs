//! 全体センチメントの集計ステージ。
//!
//! 丸め済みの記事スコアの算術平均を取り、集計専用のラベル規則を適用する。
//! 規則は記事単位の閾値より厳しく、平均が1以上でPositive、ちょうど0で
//! Neutral、それ以外はすべてNegativeになる。

use serde::Serialize;

use super::score::ScoredArticle;
use crate::analysis::SentimentLabel;
use crate::util::text::round_2dp;

/// バッチ全体の要約センチメント。ダイジェストJSONには
/// `overall_score` / `overall_sentiment` としてフラットに埋め込まれる。
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OverallSentiment {
    /// Mean of the per-article scores, rounded to two decimal places.
    #[serde(rename = "overall_score")]
    pub score: f64,
    #[serde(rename = "overall_sentiment")]
    pub label: SentimentLabel,
}

impl OverallSentiment {
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            score: 0.0,
            label: SentimentLabel::Neutral,
        }
    }
}

/// Aggregate a batch of scored articles into one overall sentiment.
///
/// The label comes from the unrounded mean: `>= 1.0` is Positive, exactly
/// `0.0` is Neutral, everything else is Negative. An empty batch is Neutral
/// with a score of `0.0`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn aggregate(articles: &[ScoredArticle]) -> OverallSentiment {
    if articles.is_empty() {
        return OverallSentiment::neutral();
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = articles.iter().map(|article| article.score).sum::<f64>() / articles.len() as f64;

    let label = if mean >= 1.0 {
        SentimentLabel::Positive
    } else if mean == 0.0 {
        SentimentLabel::Neutral
    } else {
        SentimentLabel::Negative
    };

    OverallSentiment {
        score: round_2dp(mean),
        label,
    }
}
