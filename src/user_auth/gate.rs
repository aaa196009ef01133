//! Auth gate: classifies a request as authenticated or not from its session.
//!
//! Classification never fails. A missing, unsigned, unknown or expired
//! cookie, or a store error, all mean `Unauthenticated`.

use tower_sessions::Session;

use crate::account::UserSnapshot;
use crate::session::USER_KEY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated(UserSnapshot),
    Unauthenticated,
}

impl AuthStatus {
    pub fn user(&self) -> Option<&UserSnapshot> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Unauthenticated => None,
        }
    }
}

pub async fn classify(session: &Session) -> AuthStatus {
    match session.get::<UserSnapshot>(USER_KEY).await {
        Ok(Some(user)) => AuthStatus::Authenticated(user),
        Ok(None) => AuthStatus::Unauthenticated,
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            AuthStatus::Unauthenticated
        }
    }
}
