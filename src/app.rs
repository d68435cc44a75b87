use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;

use crate::{
    analysis::{PolarityLexicon, SentimentEngine},
    api,
    config::Config,
    observability::Telemetry,
    pipeline::NewsPipeline,
    pipeline::fetch::RemoteFeedSource,
    pipeline::score::ScoreStage,
    store::{session::SessionStore, users::UserStore},
    util::retry::RetryConfig,
};

#[derive(Clone)]
pub(crate) struct AppState {
    registry: Arc<ComponentRegistry>,
}

pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    pipeline: Arc<NewsPipeline>,
    user_store: UserStore,
    session_store: Arc<SessionStore>,
}

impl AppState {
    pub(crate) fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn pipeline(&self) -> Arc<NewsPipeline> {
        Arc::clone(&self.registry.pipeline)
    }

    pub(crate) fn user_store(&self) -> &UserStore {
        &self.registry.user_store
    }

    pub(crate) fn sessions(&self) -> &SessionStore {
        &self.registry.session_store
    }
}

impl ComponentRegistry {
    /// 構成情報と依存をまとめて初期化し、アプリケーションの共有レジストリを構築する。
    ///
    /// # Errors
    /// Telemetry の初期化、レキシコン読み込み、データベース接続が失敗した
    /// 場合はエラーを返す。
    pub async fn build(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let telemetry = Telemetry::new()?;
        let metrics = telemetry.metrics();

        let lexicon = match config.lexicon_path() {
            Some(path) => PolarityLexicon::from_file(Path::new(path))
                .context("failed to load sentiment lexicon")?,
            None => PolarityLexicon::embedded(),
        };
        let engine = SentimentEngine::new(
            lexicon,
            config.positive_threshold(),
            config.negative_threshold(),
        )
        .context("failed to build sentiment engine")?;

        let retry_config = RetryConfig {
            max_attempts: config.http_max_retries(),
            base_delay_ms: config.http_backoff_base_ms(),
            max_delay_ms: config.http_backoff_cap_ms(),
        };
        let feed_source = Arc::new(
            RemoteFeedSource::new(
                config.news_feed_url().to_string(),
                config.feed_connect_timeout(),
                config.feed_total_timeout(),
                config.news_max_articles(),
                retry_config,
            )
            .context("failed to build feed source")?,
        );
        let pipeline = Arc::new(NewsPipeline::new(
            feed_source,
            ScoreStage::new(Arc::new(engine)),
            Arc::clone(&metrics),
        ));

        let user_store = UserStore::connect(
            config.users_db_dsn(),
            config.users_db_max_connections(),
        )
        .await
        .context("failed to open users store")?;
        let session_store = Arc::new(SessionStore::new(config.session_ttl()));

        Ok(Self {
            config,
            telemetry,
            pipeline,
            user_store,
            session_store,
        })
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}

pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;

    #[tokio::test]
    async fn component_registry_builds() {
        let config = {
            let _lock = ENV_MUTEX.lock().expect("env mutex");
            // SAFETY: test code adjusts deterministic environment state sequentially.
            unsafe {
                std::env::set_var("USERS_DB_DSN", "sqlite::memory:");
                std::env::remove_var("SENTIMENT_WORKER_HTTP_BIND");
                std::env::remove_var("SENTIMENT_LEXICON_PATH");
            }

            Config::from_env().expect("config loads")
        };

        let registry = ComponentRegistry::build(config)
            .await
            .expect("registry builds");
        assert_eq!(registry.config().http_bind().port(), 9007);

        let state = AppState::new(registry);

        state.telemetry().record_ready_probe();
        let token = state.sessions().issue("alice");
        assert!(state.sessions().resolve(&token).is_some());
    }
}
