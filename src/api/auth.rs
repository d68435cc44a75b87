use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app::AppState;
use crate::store::users::UserStoreError;

#[derive(Debug, Deserialize)]
pub(crate) struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenBody {
    token: String,
}

fn error_body(message: &str) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: message.to_string(),
    })
}

/// `Authorization: Bearer <token>` ヘッダーからトークンを取り出す。
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub(crate) async fn register(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> impl IntoResponse {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            error_body("username and password must not be empty"),
        )
            .into_response();
    }

    match state
        .user_store()
        .add_user(credentials.username.trim(), &credentials.password)
        .await
    {
        Ok(()) => {
            state.telemetry().metrics().users_registered_total.inc();
            info!(username = %credentials.username.trim(), "user registered");
            StatusCode::CREATED.into_response()
        }
        Err(UserStoreError::DuplicateUsername) => (
            StatusCode::CONFLICT,
            error_body("username is already taken"),
        )
            .into_response(),
        Err(UserStoreError::Database(error)) => {
            warn!(%error, "user registration failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("registration failed"),
            )
                .into_response()
        }
    }
}

pub(crate) async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> impl IntoResponse {
    let username = credentials.username.trim();

    let verified = match state
        .user_store()
        .verify_user(username, &credentials.password)
        .await
    {
        Ok(verified) => verified,
        Err(error) => {
            warn!(%error, "credential check failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("login failed"),
            )
                .into_response();
        }
    };

    if !verified {
        state.telemetry().metrics().login_failures_total.inc();
        return (
            StatusCode::UNAUTHORIZED,
            error_body("invalid username or password"),
        )
            .into_response();
    }

    let token = state.sessions().issue(username);
    let metrics = state.telemetry().metrics();
    metrics.logins_total.inc();
    #[allow(clippy::cast_precision_loss)]
    metrics
        .active_sessions
        .set(state.sessions().active_count() as f64);
    info!(username = %username, "login succeeded");

    (StatusCode::OK, Json(TokenBody { token })).into_response()
}

pub(crate) async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let Some(token) = bearer_token(&headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            error_body("missing bearer token"),
        )
            .into_response();
    };

    if state.sessions().revoke(token) {
        #[allow(clippy::cast_precision_loss)]
        state
            .telemetry()
            .metrics()
            .active_sessions
            .set(state.sessions().active_count() as f64);
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::UNAUTHORIZED, error_body("unknown session")).into_response()
    }
}
