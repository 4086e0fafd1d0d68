//! SQLite reflection store.
//!
//! Uses a single SQLite database file with one table, `reflections`, and an
//! index on `created_at` for newest-first reads. Timestamps are stored as
//! fixed-width RFC 3339 text so lexical order equals chronological order.

use crate::classify;
use async_trait::async_trait;
use careerlens_core::error::StoreError;
use careerlens_core::memory::ReflectionStore;
use careerlens_core::reflection::{NewReflection, Reflection};
use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A SQLite-backed reflection store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url`.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database. Every
    /// in-memory connection is its own database, so such a pool is pinned to
    /// one connection that is never recycled, whatever `max_connections` says.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Operation(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if is_in_memory(url) {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| classify("open SQLite", e))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite reflection store initialized at {url}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reflections (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at  TEXT NOT NULL,
                question    TEXT NOT NULL,
                answer      TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Migration(format!("reflections table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_reflections_created_at ON reflections(created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Migration(format!("created_at index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_reflection(row: &sqlx::sqlite::SqliteRow) -> Result<Reflection, StoreError> {
        let id: i64 = row
            .try_get("id")
            .map_err(|e| StoreError::Operation(format!("id column: {e}")))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::Operation(format!("created_at column: {e}")))?;
        let question: String = row
            .try_get("question")
            .map_err(|e| StoreError::Operation(format!("question column: {e}")))?;
        let answer: String = row
            .try_get("answer")
            .map_err(|e| StoreError::Operation(format!("answer column: {e}")))?;

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Operation(format!("created_at of reflection {id}: {e}")))?;

        Ok(Reflection {
            id,
            created_at,
            question,
            answer,
        })
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[async_trait]
impl ReflectionStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, reflection: NewReflection) -> Result<Reflection, StoreError> {
        let created_at = Utc::now();
        let stamp = created_at.to_rfc3339_opts(SecondsFormat::Micros, true);

        // Dropping the transaction on any early return rolls it back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("BEGIN", e))?;

        let row = sqlx::query(
            "INSERT INTO reflections (created_at, question, answer) VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(&stamp)
        .bind(reflection.question())
        .bind(reflection.answer())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify("INSERT", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| StoreError::Operation(format!("id column: {e}")))?;

        tx.commit().await.map_err(|e| classify("COMMIT", e))?;

        debug!(id, "Stored reflection");
        // Round-trip through the stored text so the returned value matches reads.
        let created_at = chrono::DateTime::parse_from_rfc3339(&stamp)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(created_at);
        Ok(reflection.into_reflection(id, created_at))
    }

    async fn list_newest_first(&self) -> Result<Vec<Reflection>, StoreError> {
        let rows = sqlx::query("SELECT * FROM reflections ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify("SELECT all", e))?;

        rows.iter().map(Self::row_to_reflection).collect()
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Reflection>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM reflections ORDER BY created_at DESC, id DESC LIMIT ?1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("SELECT recent", e))?;

        rows.iter().map(Self::row_to_reflection).collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM reflections")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify("COUNT", e))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::Operation(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| classify("ping", e))?;
        Ok(())
    }
}
