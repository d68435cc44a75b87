/// Prometheusメトリクス定義。
use prometheus::{
    Counter, Gauge, Histogram, Registry, register_counter_with_registry,
    register_gauge_with_registry, register_histogram_with_registry,
};
use std::sync::Arc;

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    // カウンター
    pub articles_fetched_total: Counter,
    pub articles_scored_total: Counter,
    pub digests_generated_total: Counter,
    pub feed_fetch_failures_total: Counter,
    pub users_registered_total: Counter,
    pub logins_total: Counter,
    pub login_failures_total: Counter,

    // ヒストグラム
    pub feed_fetch_duration_seconds: Histogram,
    pub digest_duration_seconds: Histogram,

    // ゲージ
    pub active_sessions: Gauge,
}

impl Metrics {
    /// 新しいメトリクスコレクターを作成する。
    ///
    /// # Errors
    /// 同名メトリクスが登録済みの場合はエラーを返す。
    pub fn new(registry: &Arc<Registry>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            articles_fetched_total: register_counter_with_registry!(
                "sentiment_articles_fetched_total",
                "Total number of feed articles fetched",
                registry
            )?,
            articles_scored_total: register_counter_with_registry!(
                "sentiment_articles_scored_total",
                "Total number of articles scored",
                registry
            )?,
            digests_generated_total: register_counter_with_registry!(
                "sentiment_digests_generated_total",
                "Total number of news digests generated",
                registry
            )?,
            feed_fetch_failures_total: register_counter_with_registry!(
                "sentiment_feed_fetch_failures_total",
                "Total number of failed feed fetches",
                registry
            )?,
            users_registered_total: register_counter_with_registry!(
                "sentiment_users_registered_total",
                "Total number of registered users",
                registry
            )?,
            logins_total: register_counter_with_registry!(
                "sentiment_logins_total",
                "Total number of successful logins",
                registry
            )?,
            login_failures_total: register_counter_with_registry!(
                "sentiment_login_failures_total",
                "Total number of rejected login attempts",
                registry
            )?,
            feed_fetch_duration_seconds: register_histogram_with_registry!(
                "sentiment_feed_fetch_duration_seconds",
                "Duration of feed fetch operations",
                registry
            )?,
            digest_duration_seconds: register_histogram_with_registry!(
                "sentiment_digest_duration_seconds",
                "Duration of a full digest pipeline run",
                registry
            )?,
            active_sessions: register_gauge_with_registry!(
                "sentiment_active_sessions",
                "Number of currently active sessions",
                registry
            )?,
        })
    }
}
