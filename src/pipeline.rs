use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::observability::metrics::Metrics;

pub mod aggregate;
pub(crate) mod clean;
pub mod fetch;
pub mod score;

use aggregate::OverallSentiment;
use fetch::FeedSource;
use score::{ScoreStage, ScoredArticle};

/// ニュースダイジェスト1回分の生成結果。
#[derive(Debug, Clone, Serialize)]
pub struct NewsDigest {
    pub articles: Vec<ScoredArticle>,
    #[serde(flatten)]
    pub overall: OverallSentiment,
    pub generated_at: DateTime<Utc>,
}

/// フィード取得から集計までを直列に実行するパイプライン。
pub struct NewsPipeline {
    source: Arc<dyn FeedSource>,
    score: ScoreStage,
    metrics: Arc<Metrics>,
}

impl NewsPipeline {
    pub fn new(source: Arc<dyn FeedSource>, score: ScoreStage, metrics: Arc<Metrics>) -> Self {
        Self {
            source,
            score,
            metrics,
        }
    }

    /// ダイジェストを1回生成する。
    ///
    /// # Errors
    /// フィード取得または採点に失敗した場合はエラーを返す。
    pub async fn run(&self) -> Result<NewsDigest> {
        tracing::debug!("news digest pipeline started");

        let timer = self.metrics.digest_duration_seconds.start_timer();

        let fetch_timer = self.metrics.feed_fetch_duration_seconds.start_timer();
        let raw = match self.source.fetch_articles().await {
            Ok(raw) => raw,
            Err(err) => {
                fetch_timer.observe_duration();
                self.metrics.feed_fetch_failures_total.inc();
                timer.observe_duration();
                return Err(err);
            }
        };
        fetch_timer.observe_duration();

        #[allow(clippy::cast_precision_loss)]
        self.metrics.articles_fetched_total.inc_by(raw.len() as f64);

        let articles = self.score.score_articles(raw)?;
        #[allow(clippy::cast_precision_loss)]
        self.metrics
            .articles_scored_total
            .inc_by(articles.len() as f64);
        let overall = aggregate::aggregate(&articles);

        timer.observe_duration();
        self.metrics.digests_generated_total.inc();

        tracing::debug!(
            article_count = articles.len(),
            overall_score = overall.score,
            overall_label = %overall.label,
            "news digest pipeline completed"
        );

        Ok(NewsDigest {
            articles,
            overall,
            generated_at: Utc::now(),
        })
    }
}
