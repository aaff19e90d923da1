//! SQLite record storage implementation
//!
//! Each vehicle is stored as a JSON document in a single table keyed by its
//! registration number. The primary key is the uniqueness constraint, so a
//! conflicting insert is rejected by SQLite itself.

use super::{RecordStore, StoreError};
use async_trait::async_trait;
use carcode::VehicleRecord;
use sqlx::{Row, SqlitePool, sqlite::SqliteConnectOptions};
use std::str::FromStr;

/// SQLite-based record storage
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance with the given database URL
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| unavailable("Failed to connect to SQLite", e))?;

        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Create SQLite storage from environment variable
    ///
    /// Reads DATABASE_URL, defaulting to `sqlite:carcode.db`
    pub async fn from_env() -> Result<Self, StoreError> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:carcode.db".to_string());

        Self::new(&database_url).await
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vehicles (
                reg_no TEXT PRIMARY KEY NOT NULL,   -- registration number, unique
                document TEXT NOT NULL,             -- JSON vehicle record
                created_at TEXT NOT NULL            -- RFC 3339
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| unavailable("Failed to create vehicles table", e))?;

        Ok(())
    }
}

fn unavailable(context: &str, e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {}", context, e))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl RecordStore for SqliteStorage {
    async fn find_by_reg_no(&self, reg_no: &str) -> Result<Option<VehicleRecord>, StoreError> {
        let row = sqlx::query("SELECT document FROM vehicles WHERE reg_no = ?")
            .bind(reg_no)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("Failed to look up record", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let document: String = row.get("document");
        let record = serde_json::from_str(&document).map_err(|e| StoreError::Corrupt {
            reg_no: reg_no.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Some(record))
    }

    async fn insert(&self, record: &VehicleRecord) -> Result<(), StoreError> {
        let document = serde_json::to_string(record).map_err(|e| StoreError::Corrupt {
            reg_no: record.reg_no.clone(),
            reason: e.to_string(),
        })?;

        let created_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|e| StoreError::Unavailable(format!("Failed to format timestamp: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO vehicles (reg_no, document, created_at)
            VALUES (?, ?, ?)
        "#,
        )
        .bind(&record.reg_no)
        .bind(document)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict(record.reg_no.clone())
            } else {
                unavailable("Failed to insert record", e)
            }
        })?;

        Ok(())
    }

    async fn delete(&self, reg_no: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE reg_no = ?")
            .bind(reg_no)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("Failed to delete record", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM vehicles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unavailable("Failed to count records", e))?;

        Ok(row.get::<i64, _>("count") as u64)
    }
}
