//! Authentication error types.
//!
//! Every variant renders as `{"message": ...}`. Internal failures carry only
//! the generic client-facing text; the cause is logged where it happens.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::gateway::types::MessageResponse;

pub const SIGNUP_FAILED: &str = "An error occurred during signup.";
pub const LOGIN_FAILED: &str = "An error occurred during login.";
pub const LOGOUT_FAILED: &str = "Logout failed.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Bad or missing input the user can correct
    #[error("{0}")]
    Validation(String),

    #[error("Email already exists.")]
    DuplicateEmail,

    /// Same response for unknown email and wrong password
    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Authentication required.")]
    Unauthenticated,

    /// Unexpected storage or hashing failure
    #[error("{0}")]
    Storage(&'static str),
}

impl AuthError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Duplicate is a conflict, reported as 400 to match the signup form contract
            Self::Validation(_) | Self::DuplicateEmail => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        (status, Json(MessageResponse::new(self.to_string()))).into_response()
    }
}
