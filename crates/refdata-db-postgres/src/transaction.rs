//! PostgreSQL transaction wrapper.

use async_trait::async_trait;
use refdata_core::TableSchema;
use refdata_storage::{StorageError, StoreTransaction};
use serde_json::Value;
use sqlx_postgres::PgTransaction;
use tokio::sync::Mutex;

use crate::queries;

/// Wraps an sqlx transaction. sqlx rolls it back on drop if it was never
/// committed.
///
/// The Mutex makes the wrapper `Sync`; the Option lets commit and rollback
/// take ownership.
pub struct PostgresTransaction {
    tx: Mutex<Option<Box<PgTransaction<'static>>>>,
}

impl PostgresTransaction {
    pub fn new(tx: PgTransaction<'static>) -> Self {
        Self {
            tx: Mutex::new(Some(Box::new(tx))),
        }
    }
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        if let Some(tx) = self.tx.lock().await.take() {
            tx.commit().await.map_err(|e| {
                StorageError::transaction_error(format!("Failed to commit transaction: {e}"))
            })?;
            tracing::debug!("Transaction committed");
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        if let Some(tx) = self.tx.lock().await.take() {
            tx.rollback().await.map_err(|e| {
                StorageError::transaction_error(format!("Failed to rollback transaction: {e}"))
            })?;
            tracing::debug!("Transaction rolled back");
        }
        Ok(())
    }

    async fn insert(
        &mut self,
        table: &'static TableSchema,
        row: &Value,
    ) -> Result<Value, StorageError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_deref_mut().ok_or_else(|| {
            StorageError::transaction_error("Transaction already completed (committed or rolled back)")
        })?;
        queries::crud::insert(&mut **tx, table, row).await
    }
}
