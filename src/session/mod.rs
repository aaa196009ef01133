//! Server-side sessions.
//!
//! `tower-sessions` owns the cookie: it signs the id, applies the cookie
//! attributes and hands handlers a `Session`. Records persist in
//! [`SqliteSessionStore`].

pub mod store;

use sha2::{Digest, Sha512};
use tower_sessions::cookie::Key;

pub use store::SqliteSessionStore;

pub const SESSION_COOKIE_NAME: &str = "sessionId";

/// Session data key holding the logged-in user's snapshot
pub const USER_KEY: &str = "user";

/// Attributes and signing key for the session cookie
#[derive(Clone)]
pub struct CookieSettings {
    pub path: String,
    /// Cookie `Max-Age` and record lifetime, counted from login
    pub ttl_secs: u64,
    pub secure: bool,
    key: Key,
}

impl CookieSettings {
    pub fn new(secret: &str, path: impl Into<String>, ttl_secs: u64, secure: bool) -> Self {
        Self {
            path: path.into(),
            ttl_secs,
            secure,
            key: signing_key(secret),
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn ttl(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.ttl_secs).unwrap_or(i64::MAX))
    }
}

/// Cookie signing key derived from the configured secret.
///
/// The cookie jar wants 64 bytes of key material; SHA-512 stretches a
/// secret of any length to exactly that.
pub fn signing_key(secret: &str) -> Key {
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}
