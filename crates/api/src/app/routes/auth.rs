use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::{Duration, Utc};

use crate::app::dto::LoginRequest;
use crate::app::errors;
use crate::app::services::AppServices;

/// Session tokens live for a day.
const TOKEN_TTL_HOURS: i64 = 24;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    let Some(user_id) = services.authenticate(&body.username, &body.password) else {
        tracing::warn!(username = %body.username, "rejected login attempt");
        return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid credentials");
    };

    match services
        .tokens
        .issue(user_id, Utc::now(), Duration::hours(TOKEN_TTL_HOURS))
    {
        Ok(token) => (StatusCode::OK, Json(serde_json::json!({ "token": token }))).into_response(),
        Err(_) => errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "unavailable",
            "failed to issue token",
        ),
    }
}
