use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tower_sessions::Session;

use super::error::AuthError;
use super::gate::{self, AuthStatus};

/// Reject requests without a live session.
///
/// On success the session's `UserSnapshot` is inserted as a request
/// extension for downstream handlers. Must run inside the session layer.
pub async fn require_session(
    session: Session,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    match gate::classify(&session).await {
        AuthStatus::Authenticated(user) => {
            tracing::debug!(user_id = user.id, "Session accepted");
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        AuthStatus::Unauthenticated => Err(AuthError::Unauthenticated),
    }
}
