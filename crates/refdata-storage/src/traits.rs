//! Storage traits for the record store abstraction layer.

use async_trait::async_trait;
use refdata_core::{RecordKey, TableSchema};
use serde_json::Value;

use crate::error::StorageError;
use crate::types::ListParams;

/// The main storage trait that all record store backends must implement.
///
/// Every method takes the [`TableSchema`] of the table it operates on, so one
/// implementation serves every resource. Rows are JSON objects keyed by column
/// name; fields that are not columns of the table are ignored on write.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ==================== CRUD Operations ====================

    /// Inserts a new row and returns it as stored.
    ///
    /// For [`KeyKind::Serial`](refdata_core::KeyKind::Serial) tables the key
    /// is assigned by the store and any key in `row` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a row with the same key exists.
    /// Returns `StorageError::ConstraintViolation` if a foreign key points at a
    /// missing parent or the key is missing.
    async fn insert(&self, table: &'static TableSchema, row: &Value) -> Result<Value, StorageError>;

    /// Fetches a row by primary key.
    ///
    /// Returns `None` if the row does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing rows.
    async fn fetch(
        &self,
        table: &'static TableSchema,
        key: &RecordKey,
    ) -> Result<Option<Value>, StorageError>;

    /// Replaces every column of the row identified by `key`.
    ///
    /// Columns absent from `row` become `null`. If `row` carries a different
    /// non-null key the row is re-keyed and dependent rows follow it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the row does not exist.
    /// Returns `StorageError::AlreadyExists` if re-keying collides.
    /// Returns `StorageError::ConstraintViolation` for dangling foreign keys.
    async fn replace(
        &self,
        table: &'static TableSchema,
        key: &RecordKey,
        row: &Value,
    ) -> Result<Value, StorageError>;

    /// Deletes a row; dependent rows are removed with it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the row does not exist.
    async fn remove(&self, table: &'static TableSchema, key: &RecordKey)
    -> Result<(), StorageError>;

    /// Lists rows of a table.
    async fn list(
        &self,
        table: &'static TableSchema,
        params: &ListParams,
    ) -> Result<Vec<Value>, StorageError>;

    /// Lists rows whose `column` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidRecord` if `column` is not a column of
    /// `table`.
    async fn list_by(
        &self,
        table: &'static TableSchema,
        column: &str,
        value: &Value,
        params: &ListParams,
    ) -> Result<Vec<Value>, StorageError>;

    // ==================== Transactions ====================

    /// Begins a new transaction.
    ///
    /// The transaction must be either committed or rolled back; dropping it
    /// without committing discards its writes.
    async fn begin_transaction(&self) -> Result<Box<dyn StoreTransaction>, StorageError>;

    // ==================== Metadata ====================

    /// Cheap connectivity check used by readiness probes.
    async fn ping(&self) -> Result<(), StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// A transaction for performing atomic writes.
///
/// # Example
///
/// ```ignore
/// let mut tx = store.begin_transaction().await?;
/// let row = tx.insert(&schema::COUNTRY_DOCUMENT, &document).await?;
/// tx.commit().await?;
/// ```
#[async_trait]
pub trait StoreTransaction: Send + Sync {
    /// Commits all writes made in this transaction.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// Discards all writes made in this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;

    /// Inserts a row within this transaction.
    ///
    /// See [`RecordStore::insert`] for details.
    async fn insert(
        &mut self,
        table: &'static TableSchema,
        row: &Value,
    ) -> Result<Value, StorageError>;
}
