use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::error::RelayError;
use crate::account::UserSnapshot;
use crate::gateway::state::AppState;
use crate::gateway::types::{CreateCallResponse, ErrorResponse};

/// Create Call Request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCallRequest {
    #[schema(example = "agent-123")]
    pub agent_id: String,
}

/// Obtain a web-call access token for an agent
///
/// POST /api/create-call
#[utoipa::path(
    post,
    path = "/api/create-call",
    request_body = CreateCallRequest,
    responses(
        (status = 200, description = "Access token issued", body = CreateCallResponse),
        (status = 400, description = "Missing agentId", body = ErrorResponse),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Provider returned no token", body = ErrorResponse),
        (status = 502, description = "Provider unreachable or invalid response", body = ErrorResponse),
        (status = 504, description = "Provider timed out", body = ErrorResponse)
    ),
    tag = "Call"
)]
pub async fn create_call(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserSnapshot>,
    payload: Result<Json<CreateCallRequest>, JsonRejection>,
) -> Result<Json<CreateCallResponse>, RelayError> {
    let Json(req) = payload.map_err(|_| RelayError::MissingAgentId)?;

    tracing::info!(user_id = user.id, agent_id = %req.agent_id, "Create call requested");
    let access_token = state.call_relay.create_call(&req.agent_id).await?;
    Ok(Json(CreateCallResponse { access_token }))
}
