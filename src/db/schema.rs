//! Table definitions for the users and sessions databases.
//!
//! Both are applied idempotently at startup.

use super::Database;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password TEXT NOT NULL,
    mobile TEXT,
    created_at INTEGER NOT NULL
)
"#;

const CREATE_SESSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    sid TEXT PRIMARY KEY,
    sess TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
)
"#;

const CREATE_SESSIONS_EXPIRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions (expires_at)";

/// Create the users table
pub async fn init_users_schema(db: &Database) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_USERS_TABLE).execute(db.pool()).await?;
    tracing::info!("Users schema initialized");
    Ok(())
}

/// Create the sessions table and its expiry index
pub async fn init_sessions_schema(db: &Database) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_SESSIONS_TABLE).execute(db.pool()).await?;
    sqlx::query(CREATE_SESSIONS_EXPIRY_INDEX)
        .execute(db.pool())
        .await?;
    tracing::info!("Sessions schema initialized");
    Ok(())
}
