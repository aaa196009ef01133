//! Data models for user accounts

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Server-assigned, monotonic user id (SQLite rowid)
pub type UserId = i64;

/// Stored user record, including the password hash
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string (embeds salt and cost)
    pub password_hash: String,
    pub mobile: Option<String>,
    /// Unix epoch milliseconds
    pub created_at: i64,
}

impl User {
    /// Point-in-time copy of the identity fields
    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Identity fields copied into a session at login.
///
/// Not a reference to the users table: later changes to the user row are
/// not reflected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSnapshot {
    #[schema(example = 1)]
    pub id: UserId,
    #[schema(example = "Ann")]
    pub name: String,
    #[schema(example = "ann@x.com")]
    pub email: String,
}

/// Insert payload for the credential store
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile: Option<String>,
}
