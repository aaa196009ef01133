//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use super::super::state::AppState;
use super::super::types::HealthResponse;

/// Health check endpoint
///
/// Pings the credential and session stores. Internal details are logged,
/// never returned.
///
/// - Healthy: 200 OK + `{status: "ok", timestampMs}`
/// - Unhealthy: 503 Service Unavailable + `{status: "unavailable", timestampMs}`
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Service unavailable", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let (users, sessions) = tokio::join!(
        state.users_db.health_check(),
        state.sessions_db.health_check()
    );

    let mut healthy = true;
    if let Err(e) = users {
        tracing::error!("[HEALTH] users store ping failed: {}", e);
        healthy = false;
    }
    if let Err(e) = sessions {
        tracing::error!("[HEALTH] sessions store ping failed: {}", e);
        healthy = false;
    }

    let timestamp_ms = chrono::Utc::now().timestamp_millis();
    if healthy {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                timestamp_ms,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable".to_string(),
                timestamp_ms,
            }),
        )
    }
}
