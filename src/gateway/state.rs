use std::sync::Arc;

use crate::call_relay::CallTokenRelay;
use crate::db::Database;
use crate::session::{CookieSettings, SqliteSessionStore};
use crate::user_auth::UserAuthService;
use crate::websocket::ConnectionManager;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Signup/login/logout orchestration
    pub user_auth: UserAuthService,
    /// Records behind the session layer
    pub sessions: SqliteSessionStore,
    /// Session cookie attributes and signing key
    pub session_cookie: CookieSettings,
    /// Call provider token relay
    pub call_relay: CallTokenRelay,
    /// Credential store pool, pinged by health
    pub users_db: Database,
    /// Session store pool, pinged by health
    pub sessions_db: Database,
    /// WebSocket connection manager
    pub ws_manager: Arc<ConnectionManager>,
}

impl AppState {
    pub fn new(
        user_auth: UserAuthService,
        sessions: SqliteSessionStore,
        session_cookie: CookieSettings,
        call_relay: CallTokenRelay,
        users_db: Database,
        sessions_db: Database,
    ) -> Self {
        Self {
            user_auth,
            sessions,
            session_cookie,
            call_relay,
            users_db,
            sessions_db,
            ws_manager: Arc::new(ConnectionManager::new()),
        }
    }
}
