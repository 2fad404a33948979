use std::sync::Arc;

use async_trait::async_trait;
use refdata_core::{RecordKey, TableSchema};
use refdata_storage::{ListParams, RecordStore, StorageError, StoreTransaction};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::tables::Tables;
use crate::transaction::MemoryTransaction;

/// In-memory record store.
///
/// All tables live behind one `RwLock`, so every write (including its
/// cascades) is atomic with respect to readers. Cloning the store shares the
/// same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn insert(&self, table: &'static TableSchema, row: &Value) -> Result<Value, StorageError> {
        self.state.write().await.insert(table, row)
    }

    async fn fetch(
        &self,
        table: &'static TableSchema,
        key: &RecordKey,
    ) -> Result<Option<Value>, StorageError> {
        Ok(self.state.read().await.get(table, key))
    }

    async fn replace(
        &self,
        table: &'static TableSchema,
        key: &RecordKey,
        row: &Value,
    ) -> Result<Value, StorageError> {
        self.state.write().await.replace(table, key, row)
    }

    async fn remove(
        &self,
        table: &'static TableSchema,
        key: &RecordKey,
    ) -> Result<(), StorageError> {
        self.state.write().await.remove(table, key)
    }

    async fn list(
        &self,
        table: &'static TableSchema,
        params: &ListParams,
    ) -> Result<Vec<Value>, StorageError> {
        Ok(self.state.read().await.list(table, params))
    }

    async fn list_by(
        &self,
        table: &'static TableSchema,
        column: &str,
        value: &Value,
        params: &ListParams,
    ) -> Result<Vec<Value>, StorageError> {
        self.state.read().await.list_by(table, column, value, params)
    }

    async fn begin_transaction(&self) -> Result<Box<dyn StoreTransaction>, StorageError> {
        let guard = Arc::clone(&self.state).write_owned().await;
        Ok(Box::new(MemoryTransaction::new(guard)))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
