use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use tracing::error;

use super::auth::bearer_token;
use crate::app::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    error: String,
}

/// ログイン済みユーザー向けのニュースダイジェストを返す。
///
/// フィードまたは採点が失敗した場合は502を返す。空のフィードは
/// 正常応答であり、記事ゼロ件とNeutralの全体ラベルになる。
pub(crate) async fn digest(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let authorized = bearer_token(&headers)
        .and_then(|token| state.sessions().resolve(token))
        .is_some();

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: "authentication required".to_string(),
            }),
        )
            .into_response();
    }

    match state.pipeline().run().await {
        Ok(digest) => (StatusCode::OK, Json(digest)).into_response(),
        Err(err) => {
            error!(error = ?err, "news digest generation failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: "failed to generate news digest".to_string(),
                }),
            )
                .into_response()
        }
    }
}
