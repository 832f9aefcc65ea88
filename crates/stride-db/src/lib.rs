//! # stride-db
//!
//! libSQL persistence for the Stride journal: append-only entries and
//! interpretations, the monotonic per-day activity aggregate, and the goal,
//! phase and settings tables the analysis pipeline reads.
//!
//! Repository methods live on [`service::StrideService`] in `repos/*`.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;

use crate::retry::{RetryConfig, is_transient_lock_error};

/// Database handle: one libSQL database and its connection.
pub struct StrideDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    retry: RetryConfig,
}

impl StrideDb {
    /// Open a local database at `path` (`:memory:` for an ephemeral one) and
    /// run migrations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Foreign keys are per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let stride_db = Self {
            db,
            conn,
            retry: RetryConfig::default(),
        };
        stride_db.run_migrations().await?;
        Ok(stride_db)
    }

    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed id via libSQL, e.g. `"ent-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Execute a statement, retrying on lock contention.
    ///
    /// `make_params` is called once per attempt because libSQL consumes params.
    ///
    /// # Errors
    ///
    /// Returns the last `libsql::Error` once retries are exhausted, or the
    /// first non-transient error immediately.
    pub async fn execute_with<F, P>(&self, sql: &str, make_params: F) -> Result<u64, DatabaseError>
    where
        F: Fn() -> P,
        P: IntoParams,
    {
        let mut attempt = 1;
        loop {
            match self.conn.execute(sql, make_params()).await {
                Ok(n) => return Ok(n),
                Err(e) if is_transient_lock_error(&e) && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::debug!(attempt, ?delay, error = %e, "database busy, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Run a query, retrying on lock contention.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute_with`].
    pub async fn query_with<F, P>(
        &self,
        sql: &str,
        make_params: F,
    ) -> Result<libsql::Rows, DatabaseError>
    where
        F: Fn() -> P,
        P: IntoParams,
    {
        let mut attempt = 1;
        loop {
            match self.conn.query(sql, make_params()).await {
                Ok(rows) => return Ok(rows),
                Err(e) if is_transient_lock_error(&e) && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::debug!(attempt, ?delay, error = %e, "database busy, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> StrideDb {
        StrideDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let tables = [
            "goals",
            "phases",
            "entries",
            "interpretations",
            "daily_activity",
            "settings",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("ent").await.unwrap();
        assert!(id.starts_with("ent-"), "{id}");
        assert_eq!(id.len(), 12, "{id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in stride_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("int").await.unwrap();
            assert!(ids.insert(id.clone()), "duplicate id {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn blank_entry_text_violates_check() {
        let db = test_db().await;
        let result = db
            .execute_with(
                "INSERT INTO entries (id, text, created_at) VALUES ('e1', '   ', '2026-01-01T00:00:00Z')",
                || (),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = test_db().await;
        let result = db
            .execute_with(
                "INSERT INTO daily_activity (day, goal_id, level, rank, updated_at)
                 VALUES ('2026-01-01', 'gol-missing', 'full', 2, '2026-01-01T00:00:00Z')",
                || (),
            )
            .await;
        assert!(result.is_err());
    }
}
