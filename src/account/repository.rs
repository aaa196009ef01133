//! Credential store: the users table.
//!
//! Email uniqueness is enforced by the table's UNIQUE constraint, so two
//! concurrent signups for the same address cannot both succeed.

use super::models::{NewUser, User, UserId};
use super::validation::{ValidationError, require_non_empty};
use crate::db::Database;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Email already exists")]
    DuplicateEmail,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// User repository backed by SQLite
#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a user and return its id.
    ///
    /// Fails with `DuplicateEmail` when the constraint rejects the row; no
    /// lookup is done beforehand.
    pub async fn create(&self, user: &NewUser) -> Result<UserId, RepositoryError> {
        require_non_empty("name", &user.name)?;
        require_non_empty("email", &user.email)?;
        require_non_empty("password", &user.password_hash)?;

        let mobile = user.mobile.as_deref().filter(|m| !m.is_empty());
        let now = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query(
            r#"INSERT INTO users (name, email, password, mobile, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(mobile)
        .bind(now)
        .execute(self.db.pool())
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => RepositoryError::DuplicateEmail,
            _ => RepositoryError::Database(e),
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Exact, case-sensitive email lookup
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT id, name, email, password, mobile, created_at
               FROM users WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::row_to_user).transpose()?)
    }

    fn row_to_user(row: &SqliteRow) -> Result<User, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
            mobile: row.try_get("mobile")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
