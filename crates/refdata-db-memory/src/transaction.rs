//! Transactions for the in-memory store.
//!
//! A transaction holds the store's write lock for its whole lifetime and
//! works on a private copy of the tables. Commit swaps the copy in; rollback
//! or drop throws it away.

use async_trait::async_trait;
use refdata_core::TableSchema;
use refdata_storage::{StorageError, StoreTransaction};
use serde_json::Value;
use tokio::sync::OwnedRwLockWriteGuard;

use crate::tables::Tables;

pub struct MemoryTransaction {
    guard: OwnedRwLockWriteGuard<Tables>,
    working: Tables,
}

impl MemoryTransaction {
    pub(crate) fn new(guard: OwnedRwLockWriteGuard<Tables>) -> Self {
        let working = guard.clone();
        Self { guard, working }
    }
}

impl std::fmt::Debug for MemoryTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransaction").finish_non_exhaustive()
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        Ok(())
    }

    async fn insert(
        &mut self,
        table: &'static TableSchema,
        row: &Value,
    ) -> Result<Value, StorageError> {
        self.working.insert(table, row)
    }
}
