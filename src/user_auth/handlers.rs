use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::error::AuthError;
use super::gate;
use super::service::{LoginRequest, SignupRequest};
use crate::gateway::state::AppState;
use crate::gateway::types::{CheckAuthResponse, LoginResponse, MessageResponse};

/// Register a new user
///
/// POST /api/signup
#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered successfully", body = MessageResponse),
        (status = 400, description = "Invalid input or email already exists", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    ),
    tag = "Auth"
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("Signup body rejected: {}", e);
        AuthError::Validation("Please fill in all fields.".to_string())
    })?;

    state.user_auth.signup(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully.")),
    ))
}

/// Login and receive a session cookie
///
/// POST /api/login
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("Login body rejected: {}", e);
        AuthError::Validation("Please provide email and password.".to_string())
    })?;

    // The session layer sets the cookie on the way out
    let user = state.user_auth.login(req, &session).await?;

    Ok(Json(LoginResponse {
        message: "Login successful.".to_string(),
        user,
    }))
}

/// Report whether the request carries a live session
///
/// GET /api/check-auth
#[utoipa::path(
    get,
    path = "/api/check-auth",
    responses(
        (status = 200, description = "Authentication status", body = CheckAuthResponse)
    ),
    tag = "Auth"
)]
pub async fn check_auth(session: Session) -> Json<CheckAuthResponse> {
    let status = gate::classify(&session).await;
    let user = status.user().cloned();
    Json(CheckAuthResponse {
        is_authenticated: user.is_some(),
        user,
    })
}

/// Destroy the current session and clear its cookie
///
/// GET /api/logout
#[utoipa::path(
    get,
    path = "/api/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 500, description = "Session store failure", body = MessageResponse)
    ),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<MessageResponse>, AuthError> {
    // A flushed session makes the layer send an expired cookie
    state.user_auth.logout(&session).await?;
    Ok(Json(MessageResponse::new("Logout successful.")))
}
