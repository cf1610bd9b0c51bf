//! Storage repository
//!
//! Raw access to the `kv_store` table. Values are opaque JSON text here;
//! typed (de)serialization happens in `services::store`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::db::DynDatabasePool;

/// A stored key-value pair
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for key-value snapshot operations
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Get a single entry by key
    async fn get(&self, key: &str) -> Result<Option<StoredEntry>>;

    /// Get all entries, ordered by key
    async fn get_all(&self) -> Result<Vec<StoredEntry>>;

    /// List keys starting with `prefix`
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Insert or overwrite an entry
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete an entry. Returns whether a row was removed.
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// SQLx-based storage repository
pub struct SqlxStorageRepository {
    pool: DynDatabasePool,
}

impl SqlxStorageRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> StoredEntry {
    StoredEntry {
        key: row.get("key"),
        value: row.get("value"),
        updated_at: row.get("updated_at"),
    }
}

/// Escape LIKE wildcards so a prefix matches literally
fn like_prefix(prefix: &str) -> String {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{}%", escaped)
}

#[async_trait]
impl StorageRepository for SqlxStorageRepository {
    async fn get(&self, key: &str) -> Result<Option<StoredEntry>> {
        let row = sqlx::query("SELECT key, value, updated_at FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool.sqlite())
            .await?;

        Ok(row.as_ref().map(row_to_entry))
    }

    async fn get_all(&self) -> Result<Vec<StoredEntry>> {
        let rows = sqlx::query("SELECT key, value, updated_at FROM kv_store ORDER BY key")
            .fetch_all(self.pool.sqlite())
            .await?;

        Ok(rows.iter().map(row_to_entry).collect())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM kv_store WHERE key LIKE ? ESCAPE '\\' ORDER BY key")
            .bind(like_prefix(prefix))
            .fetch_all(self.pool.sqlite())
            .await?;

        Ok(rows.iter().map(|r| r.get("key")).collect())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(self.pool.sqlite())
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(self.pool.sqlite())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
