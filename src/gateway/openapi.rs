//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:5000/docs`
//! - OpenAPI JSON: `http://localhost:5000/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::UserSnapshot;
use crate::call_relay::handlers::CreateCallRequest;
use crate::gateway::types::{
    CheckAuthResponse, CreateCallResponse, ErrorResponse, HealthResponse, LoginResponse,
    MessageResponse,
};
use crate::user_auth::{LoginRequest, SignupRequest};

/// Signed session cookie issued by `/api/login`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    crate::session::SESSION_COOKIE_NAME,
                    "HttpOnly session cookie set by POST /api/login",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Harmoni API",
        version = "1.0.0",
        description = "Session-cookie authentication and voice-call token relay."
    ),
    servers(
        (url = "http://localhost:5000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::user_auth::handlers::signup,
        crate::user_auth::handlers::login,
        crate::user_auth::handlers::check_auth,
        crate::user_auth::handlers::logout,
        crate::call_relay::handlers::create_call,
    ),
    components(
        schemas(
            SignupRequest,
            LoginRequest,
            CreateCallRequest,
            UserSnapshot,
            MessageResponse,
            ErrorResponse,
            LoginResponse,
            CheckAuthResponse,
            CreateCallResponse,
            HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Signup, login, logout and session status"),
        (name = "Call", description = "Voice call token relay (session required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
