//! Durable session store behind `tower-sessions`.
//!
//! Records live in SQLite so sessions survive restarts. Expiry is checked on
//! every load; the background sweeper only reclaims space.

use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tower_sessions::SessionStore;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;

use crate::db::Database;

fn backend(e: sqlx::Error) -> session_store::Error {
    session_store::Error::Backend(e.to_string())
}

fn unix_ms(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

fn now_ms() -> i64 {
    unix_ms(OffsetDateTime::now_utc())
}

/// Session records in the `sessions` table: sole owner of that table
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    db: Database,
}

impl SqliteSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn load_at(&self, id: &Id, now: i64) -> session_store::Result<Option<Record>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT sess, expires_at FROM sessions WHERE sid = ?")
                .bind(id.to_string())
                .fetch_optional(self.db.pool())
                .await
                .map_err(backend)?;

        let Some((sess, expires_at)) = row else {
            return Ok(None);
        };

        if expires_at <= now {
            // Lazy expiry: drop the row now instead of waiting for the sweeper
            self.delete(id).await?;
            return Ok(None);
        }

        let data = serde_json::from_str(&sess)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;
        let expiry_date =
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(expires_at) * 1_000_000)
                .map_err(|e| session_store::Error::Decode(e.to_string()))?;

        Ok(Some(Record {
            id: *id,
            data,
            expiry_date,
        }))
    }

    /// Delete every expired row, returning how many were removed
    pub async fn sweep_expired(&self) -> Result<u64, sqlx::Error> {
        self.sweep_expired_at(now_ms()).await
    }

    async fn sweep_expired_at(&self, now: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }

    /// Run `sweep_expired` every `interval` until the runtime shuts down
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match store.sweep_expired().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!(removed = n, "Expired sessions swept"),
                    Err(e) => tracing::warn!("Session sweep failed: {}", e),
                }
            }
        })
    }
}

fn encode(record: &Record) -> session_store::Result<String> {
    serde_json::to_string(&record.data).map_err(|e| session_store::Error::Encode(e.to_string()))
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let sess = encode(record)?;
        let now = now_ms();
        loop {
            let inserted = sqlx::query(
                r#"INSERT INTO sessions (sid, sess, created_at, expires_at)
                   VALUES (?, ?, ?, ?)
                   ON CONFLICT(sid) DO NOTHING"#,
            )
            .bind(record.id.to_string())
            .bind(sess.as_str())
            .bind(now)
            .bind(unix_ms(record.expiry_date))
            .execute(self.db.pool())
            .await
            .map_err(backend)?
            .rows_affected();

            if inserted == 1 {
                tracing::debug!("Session created");
                return Ok(());
            }
            // Id already taken; draw another
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        sqlx::query(
            r#"INSERT INTO sessions (sid, sess, created_at, expires_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(sid) DO UPDATE SET
                   sess = excluded.sess,
                   expires_at = excluded.expires_at"#,
        )
        .bind(record.id.to_string())
        .bind(encode(record)?)
        .bind(now_ms())
        .bind(unix_ms(record.expiry_date))
        .execute(self.db.pool())
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        self.load_at(session_id, now_ms()).await
    }

    /// Succeeds whether or not the record exists
    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE sid = ?")
            .bind(session_id.to_string())
            .execute(self.db.pool())
            .await
            .map_err(backend)?;
        Ok(())
    }
}
