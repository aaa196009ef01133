//! Call relay error types.
//!
//! Bodies are `{"error": ...}` and never include the provider credential or
//! the provider's raw response text.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::gateway::types::ErrorResponse;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("Agent ID is required.")]
    MissingAgentId,

    /// No provider credential configured
    #[error("Call service unavailable.")]
    NotConfigured,

    /// Provider answered with a non-success status
    #[error("Call provider error (status {status}).")]
    Upstream { status: u16 },

    /// No response within the configured timeout. Retryable.
    #[error("Call provider timed out.")]
    Timeout,

    #[error("Call provider unreachable.")]
    Transport(String),

    /// Provider answered 2xx with a body that does not match the schema
    #[error("Call provider returned an invalid response.")]
    InvalidResponse(String),

    #[error("Call provider did not return an access token.")]
    MissingToken,
}

impl RelayError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::MissingAgentId => StatusCode::BAD_REQUEST,
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream { status } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Transport(_) | Self::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            Self::MissingToken => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
