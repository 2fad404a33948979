//! PostgreSQL implementation of the `RecordStore` trait.

use async_trait::async_trait;
use refdata_core::{RecordKey, TableSchema};
use refdata_storage::{ListParams, RecordStore, StorageError, StoreTransaction};
use serde_json::Value;
use sqlx_postgres::PgPool;

use crate::config::PostgresConfig;
use crate::transaction::PostgresTransaction;
use crate::{migrations, pool, queries};

/// PostgreSQL record store.
///
/// Referential integrity (uniqueness, foreign keys, cascades) is enforced by
/// the schema created in the embedded migrations.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new `PostgresStore` with the given configuration.
    ///
    /// This will:
    /// 1. Create a connection pool
    /// 2. Run migrations (if configured)
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be created
    /// or if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;

        if config.run_migrations {
            migrations::run(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Creates a new `PostgresStore` from an existing connection pool.
    ///
    /// Migrations are not run automatically when using this constructor.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn insert(&self, table: &'static TableSchema, row: &Value) -> Result<Value, StorageError> {
        queries::crud::insert(&self.pool, table, row).await
    }

    async fn fetch(
        &self,
        table: &'static TableSchema,
        key: &RecordKey,
    ) -> Result<Option<Value>, StorageError> {
        queries::crud::fetch(&self.pool, table, key).await
    }

    async fn replace(
        &self,
        table: &'static TableSchema,
        key: &RecordKey,
        row: &Value,
    ) -> Result<Value, StorageError> {
        queries::crud::replace(&self.pool, table, key, row).await
    }

    async fn remove(
        &self,
        table: &'static TableSchema,
        key: &RecordKey,
    ) -> Result<(), StorageError> {
        queries::crud::remove(&self.pool, table, key).await
    }

    async fn list(
        &self,
        table: &'static TableSchema,
        params: &ListParams,
    ) -> Result<Vec<Value>, StorageError> {
        queries::crud::list(&self.pool, table, params).await
    }

    async fn list_by(
        &self,
        table: &'static TableSchema,
        column: &str,
        value: &Value,
        params: &ListParams,
    ) -> Result<Vec<Value>, StorageError> {
        queries::crud::list_by(&self.pool, table, column, value, params).await
    }

    async fn begin_transaction(&self) -> Result<Box<dyn StoreTransaction>, StorageError> {
        let tx = self.pool.begin().await.map_err(|e| {
            StorageError::transaction_error(format!("Failed to begin transaction: {e}"))
        })?;
        Ok(Box::new(PostgresTransaction::new(tx)))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        pool::ping(&self.pool).await.map_err(Into::into)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
