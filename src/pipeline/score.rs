//! 記事採点ステージ。
//!
//! タイトルとクリーニング済みサマリを連結した本文を感情エンジンに掛け、
//! 合成スコアを小数第2位に丸めて返す。入力の順序と件数は必ず保存する。

use std::sync::Arc;

use serde::Serialize;

use super::clean::strip_html;
use super::fetch::RawFeedArticle;
use crate::analysis::{EngineError, SentimentEngine, SentimentLabel};
use crate::util::text::round_2dp;

/// 採点済みの記事1件。レスポンスにそのまま直列化される。
#[derive(Debug, Clone, Serialize)]
pub struct ScoredArticle {
    pub title: String,
    pub link: String,
    pub summary: String,
    /// Compound score rounded to two decimal places.
    pub score: f64,
    pub sentiment: SentimentLabel,
}

/// ステートレスな採点ステージ。エンジン1個を全記事で共有する。
pub struct ScoreStage {
    engine: Arc<SentimentEngine>,
}

impl ScoreStage {
    #[must_use]
    pub fn new(engine: Arc<SentimentEngine>) -> Self {
        Self { engine }
    }

    /// Score a batch of raw articles, preserving order and count.
    ///
    /// The scored text is `title + " " + cleaned summary`; articles with an
    /// empty summary are scored on the title alone plus the separator,
    /// which normalizes away.
    ///
    /// # Errors
    /// エンジンが採点に失敗した場合はエラーを返す。
    pub fn score_articles(
        &self,
        raw: Vec<RawFeedArticle>,
    ) -> Result<Vec<ScoredArticle>, EngineError> {
        raw.into_iter()
            .map(|article| self.score_article(article))
            .collect()
    }

    fn score_article(&self, article: RawFeedArticle) -> Result<ScoredArticle, EngineError> {
        let summary = strip_html(&article.summary_html);
        let text = format!("{} {}", article.title, summary);
        let result = self.engine.score(&text)?;

        Ok(ScoredArticle {
            title: article.title,
            link: article.link,
            summary,
            score: round_2dp(result.compound),
            sentiment: result.label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SentimentEngine;

    fn stage() -> ScoreStage {
        let engine = SentimentEngine::with_embedded_lexicon().expect("embedded lexicon");
        ScoreStage::new(Arc::new(engine))
    }

    fn raw(title: &str, summary_html: &str) -> RawFeedArticle {
        RawFeedArticle {
            title: title.to_string(),
            summary_html: summary_html.to_string(),
            link: "https://example.com/a".to_string(),
        }
    }

    #[test]
    fn preserves_order_and_count() {
        let articles = vec![
            raw("First wonderful story", ""),
            raw("Second terrible story", ""),
            raw("Third story", ""),
        ];

        let scored = stage().score_articles(articles).expect("score");
        assert_eq!(scored.len(), 3);
        assert_eq!(scored[0].title, "First wonderful story");
        assert_eq!(scored[1].title, "Second terrible story");
        assert_eq!(scored[2].title, "Third story");
    }

    #[test]
    fn scores_are_rounded_to_two_decimals() {
        let scored = stage()
            .score_articles(vec![raw("Absolutely fantastic progress", "")])
            .expect("score");

        let score = scored[0].score;
        assert!((score * 100.0 - (score * 100.0).round()).abs() < 1e-9);
        assert!(score >= 0.05);
        assert_eq!(scored[0].sentiment, SentimentLabel::Positive);
    }

    #[test]
    fn summary_markup_is_stripped_before_scoring() {
        let scored = stage()
            .score_articles(vec![raw("Update", "<p>A <b>terrible</b> crisis unfolds.</p>")])
            .expect("score");

        assert_eq!(scored[0].summary, "A terrible crisis unfolds.");
        assert_eq!(scored[0].sentiment, SentimentLabel::Negative);
    }

    #[test]
    fn empty_batch_yields_empty_result() {
        let scored = stage().score_articles(Vec::new()).expect("score");
        assert!(scored.is_empty());
    }

    #[test]
    fn neutral_article_scores_zero() {
        let scored = stage()
            .score_articles(vec![raw("The committee met on Tuesday", "")])
            .expect("score");

        assert!(scored[0].score.abs() < 0.05);
        assert_eq!(scored[0].sentiment, SentimentLabel::Neutral);
    }
}
