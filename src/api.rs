pub(crate) mod auth;
pub(crate) mod health;
pub(crate) mod news;

use axum::{
    Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::app::AppState;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics))
        .route("/v1/auth/register", post(auth::register))
        .route("/v1/auth/login", post(auth::login))
        .route("/v1/auth/logout", post(auth::logout))
        .route("/v1/news", get(news::digest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Prometheusのテキスト形式でメトリクスを返す。
async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.telemetry().render_prometheus();
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use crate::{
        app::{ComponentRegistry, build_router},
        config::{Config, ENV_MUTEX},
    };

    async fn app() -> axum::Router {
        let config = {
            let _lock = ENV_MUTEX.lock().expect("env mutex");
            // SAFETY: tests run sequentially and assign valid UTF-8 values.
            unsafe {
                std::env::set_var("USERS_DB_DSN", "sqlite::memory:");
                std::env::remove_var("SENTIMENT_LEXICON_PATH");
            }
            Config::from_env().expect("config loads")
        };

        let registry = ComponentRegistry::build(config)
            .await
            .expect("registry builds");
        build_router(registry)
    }

    #[tokio::test]
    async fn live_probe_reports_live_status() {
        let request = Request::get("/health/live")
            .body(Body::empty())
            .expect("request builds");

        let response = app().await.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("valid json");
        assert_eq!(payload["status"].as_str(), Some("live"));
    }

    #[tokio::test]
    async fn metrics_render_as_prometheus_text() {
        let request = Request::get("/metrics")
            .body(Body::empty())
            .expect("request builds");

        let response = app().await.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("text/plain; version=0.0.4")
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let rendered = String::from_utf8(body.to_vec()).expect("utf-8 body");
        assert!(rendered.contains("sentiment_digests_generated_total"));
    }

    #[tokio::test]
    async fn news_digest_requires_authentication() {
        let request = Request::get("/v1/news")
            .body(Body::empty())
            .expect("request builds");

        let response = app().await.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
