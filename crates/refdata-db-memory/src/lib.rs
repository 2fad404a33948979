//! In-memory record store for the reference data service.
//!
//! This crate provides an in-memory implementation of the `RecordStore` trait
//! from `refdata-storage`. It enforces the same rules as the PostgreSQL
//! schema: unique primary keys, foreign keys that must resolve, and cascading
//! deletes and key updates from parent to child rows.
//!
//! # Example
//!
//! ```ignore
//! use refdata_core::schema;
//! use refdata_db_memory::InMemoryStore;
//! use refdata_storage::RecordStore;
//!
//! let store = InMemoryStore::new();
//! let region = store.insert(&schema::REGION, &serde_json::json!({"id": "EU"})).await?;
//! ```

mod storage;
mod tables;
mod transaction;

pub use refdata_storage::{RecordStore, StorageError};
pub use storage::InMemoryStore;
pub use transaction::MemoryTransaction;

/// Creates a new shared in-memory record store.
pub fn create_store() -> refdata_storage::DynStore {
    std::sync::Arc::new(InMemoryStore::new())
}
