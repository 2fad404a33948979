//! # refdata-storage
//!
//! Storage abstraction layer for the reference data service.
//!
//! This crate defines the traits and types that all record store backends must
//! implement. It does not contain any implementations - those are provided by
//! `refdata-db-postgres` and `refdata-db-memory`.
//!
//! ## Overview
//!
//! The main trait is [`RecordStore`]. Rows travel as JSON objects whose keys
//! are the column names of a [`TableSchema`](refdata_core::TableSchema); the
//! backend is responsible for:
//! - primary-key uniqueness (`StorageError::AlreadyExists`)
//! - foreign-key checks on write (`StorageError::ConstraintViolation`)
//! - cascading deletes and key updates from parent to child rows
//!
//! ## Example
//!
//! ```ignore
//! use refdata_core::{RecordKey, schema};
//! use refdata_storage::{RecordStore, StorageError};
//!
//! async fn region_exists(store: &dyn RecordStore, id: &str) -> Result<bool, StorageError> {
//!     let row = store.fetch(&schema::REGION, &RecordKey::from(id)).await?;
//!     Ok(row.is_some())
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::{RecordStore, StoreTransaction};
pub use types::{DEFAULT_LIST_LIMIT, ListParams};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared record store trait object.
pub type DynStore = std::sync::Arc<dyn RecordStore>;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ErrorCategory, StorageError};
    pub use crate::traits::{RecordStore, StoreTransaction};
    pub use crate::types::ListParams;
    pub use crate::{DynStore, StorageResult};
}
