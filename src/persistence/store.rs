//! SQLite-based configuration store

use crate::core::ConfigStoreError;
use crate::persistence::ConfigStore;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

/// SQLite configuration store
pub struct SqliteConfigStore {
    pool: SqlitePool,
    pending: Mutex<BTreeMap<String, String>>,
}

impl SqliteConfigStore {
    /// Open (or create) the store at `db_path`
    pub async fn new(db_path: &Path) -> Result<Self, ConfigStoreError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| open_error(db_path, e))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| open_error(db_path, e))?;

        let store = Self {
            pool,
            pending: Mutex::new(BTreeMap::new()),
        };
        store.init().await?;

        Ok(store)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<(), ConfigStoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS config_values (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ConfigStoreError::Read {
            key: "config_values".to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }
}

fn open_error(path: &Path, err: impl std::fmt::Display) -> ConfigStoreError {
    ConfigStoreError::Read {
        key: path.display().to_string(),
        message: err.to_string(),
    }
}

#[async_trait::async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ConfigStoreError> {
        if let Some(value) = self.pending.lock().await.get(key) {
            return Ok(Some(value.clone()));
        }

        let row = sqlx::query("SELECT value FROM config_values WHERE name = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ConfigStoreError::Read {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ConfigStoreError> {
        self.pending
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn flush(&self) -> Result<(), ConfigStoreError> {
        let mut pending = self.pending.lock().await;
        if pending.is_empty() {
            return Ok(());
        }

        let flush_error = |e: sqlx::Error| ConfigStoreError::Flush(e.to_string());

        // Dropping the transaction on error rolls every write back
        let mut tx = self.pool.begin().await.map_err(flush_error)?;
        let now = Utc::now().to_rfc3339();
        for (name, value) in pending.iter() {
            sqlx::query(
                r#"
                INSERT INTO config_values (name, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
            )
            .bind(name)
            .bind(value)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(flush_error)?;
        }
        tx.commit().await.map_err(flush_error)?;

        debug!("Flushed {} configuration values", pending.len());
        pending.clear();
        Ok(())
    }
}
