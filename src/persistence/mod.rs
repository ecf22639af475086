//! Persisted configuration store

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteConfigStore;

use crate::core::ConfigStoreError;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Key/value configuration shared with the installed application
///
/// `set` only stages a write; nothing is visible to other readers of the
/// underlying storage until `flush` commits every staged write at once.
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// Current value of `key`, including staged writes
    async fn get(&self, key: &str) -> Result<Option<String>, ConfigStoreError>;

    /// Stage a write
    async fn set(&self, key: &str, value: &str) -> Result<(), ConfigStoreError>;

    /// Commit all staged writes atomically
    async fn flush(&self) -> Result<(), ConfigStoreError>;
}

/// In-memory store (for testing or ephemeral use)
#[derive(Default)]
pub struct InMemoryConfigStore {
    committed: RwLock<HashMap<String, String>>,
    pending: RwLock<HashMap<String, String>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with committed values
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            committed: RwLock::new(values.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
            pending: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of committed values
    pub async fn committed(&self) -> HashMap<String, String> {
        self.committed.read().await.clone()
    }
}

#[async_trait::async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ConfigStoreError> {
        if let Some(value) = self.pending.read().await.get(key) {
            return Ok(Some(value.clone()));
        }
        Ok(self.committed.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ConfigStoreError> {
        self.pending
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn flush(&self) -> Result<(), ConfigStoreError> {
        let mut pending = self.pending.write().await;
        let mut committed = self.committed.write().await;
        committed.extend(pending.drain());
        Ok(())
    }
}
