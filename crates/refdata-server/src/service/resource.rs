//! Generic create/read/update/delete/list over one table.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use refdata_core::{Record, RecordKey, TableSchema, schema};
use refdata_storage::{DynStore, ListParams, RecordStore, StorageError, StorageResult};
use serde_json::Value;

use super::binding::ResourceBinding;
use super::error::ServiceError;
use crate::cache::DynCache;
use crate::metrics::record_operation;

/// Default and ceiling for list windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self {
            default_limit: refdata_storage::DEFAULT_LIST_LIMIT,
            max_limit: refdata_storage::DEFAULT_LIST_LIMIT,
        }
    }
}

impl ListLimits {
    /// Builds the window for a request, clamping `limit` to the ceiling.
    pub fn window(&self, skip: Option<usize>, limit: Option<usize>) -> ListParams {
        ListParams::new()
            .with_skip(skip.unwrap_or(0))
            .with_limit(limit.unwrap_or(self.default_limit).min(self.max_limit))
    }
}

/// CRUD for record type `R`, with the cache calls its binding asks for.
pub struct ResourceService<R> {
    store: DynStore,
    cache: DynCache,
    binding: &'static ResourceBinding,
    limits: ListLimits,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> ResourceService<R> {
    pub fn new(store: DynStore, cache: DynCache, binding: &'static ResourceBinding) -> Self {
        Self {
            store,
            cache,
            binding,
            limits: ListLimits::default(),
            _record: PhantomData,
        }
    }

    pub fn with_limits(mut self, limits: ListLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn binding(&self) -> &'static ResourceBinding {
        self.binding
    }

    pub fn limits(&self) -> ListLimits {
        self.limits
    }

    pub fn store(&self) -> &DynStore {
        &self.store
    }

    /// Inserts `input`. A duplicate key or dangling parent reference is a conflict.
    pub async fn create(&self, input: &R) -> Result<R, ServiceError> {
        let mut row = serde_json::to_value(input)?;
        clear_blank_key(R::SCHEMA, &mut row);
        let stored = self.store.insert(R::SCHEMA, &row).await?;
        self.created(stored).await
    }

    /// Completes a create once the row is in the store: expands children,
    /// mirrors the record and returns it.
    pub(crate) async fn created(&self, stored: Value) -> Result<R, ServiceError> {
        if self.binding.cache.populate_on_create {
            self.mirror(&stored).await;
        }
        let record: R = self.materialize(stored).await?;
        record_operation(self.binding.name, "create");
        Ok(record)
    }

    pub async fn get(&self, key: &RecordKey) -> Result<R, ServiceError> {
        if self.binding.cache.read_on_get {
            if let Some(row) = self.cached(key).await {
                let record = self.materialize(row).await?;
                record_operation(self.binding.name, "read");
                return Ok(record);
            }
        }

        let row = self
            .store
            .fetch(R::SCHEMA, key)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let record = self.materialize(row).await?;
        record_operation(self.binding.name, "read");
        Ok(record)
    }

    /// Replaces every column of the row. A non-blank key in `input` that
    /// differs from `key` renames the row; children follow.
    pub async fn update(&self, key: &RecordKey, input: &R) -> Result<R, ServiceError> {
        let mut row = serde_json::to_value(input)?;
        clear_blank_key(R::SCHEMA, &mut row);

        let stored = self.store.replace(R::SCHEMA, key, &row).await?;
        if self.binding.cache.refresh_on_update {
            self.mirror(&stored).await;
        }
        let record = self.materialize(stored).await?;
        record_operation(self.binding.name, "update");
        Ok(record)
    }

    /// Removes the row and everything that references it. Returns the row
    /// as it was.
    pub async fn delete(&self, key: &RecordKey) -> Result<R, ServiceError> {
        let row = self
            .store
            .fetch(R::SCHEMA, key)
            .await?
            .ok_or(ServiceError::NotFound)?;
        self.store.remove(R::SCHEMA, key).await?;

        if self.binding.cache.evict_on_delete {
            self.cache.evict(self.binding.name, &key.to_string()).await;
        }
        record_operation(self.binding.name, "delete");
        Ok(serde_json::from_value(row)?)
    }

    /// Lists straight from the store; the mirror is never consulted.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<R>, ServiceError> {
        let rows = self.store.list(R::SCHEMA, params).await?;
        let records = self.materialize_all(rows).await?;
        record_operation(self.binding.name, "list");
        Ok(records)
    }

    /// Lists rows whose `column` equals `value`.
    pub async fn list_by(
        &self,
        column: &str,
        value: &Value,
        params: &ListParams,
    ) -> Result<Vec<R>, ServiceError> {
        let rows = self.store.list_by(R::SCHEMA, column, value, params).await?;
        let records = self.materialize_all(rows).await?;
        record_operation(self.binding.name, "list");
        Ok(records)
    }

    async fn materialize(&self, row: Value) -> Result<R, ServiceError> {
        let expanded = expand_children(self.store.as_ref(), R::SCHEMA, row).await?;
        Ok(serde_json::from_value(expanded)?)
    }

    async fn materialize_all(&self, rows: Vec<Value>) -> Result<Vec<R>, ServiceError> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(self.materialize(row).await?);
        }
        Ok(records)
    }

    /// Mirrors the flat row; children are always expanded from the store.
    async fn mirror(&self, row: &Value) {
        let Some(key) = R::SCHEMA.key_of(row) else {
            return;
        };
        match serde_json::to_vec(row) {
            Ok(bytes) => {
                self.cache
                    .put(self.binding.name, &key.to_string(), &bytes)
                    .await
            }
            Err(e) => {
                tracing::warn!(resource = self.binding.name, error = %e, "cannot serialize record for cache");
            }
        }
    }

    async fn cached(&self, key: &RecordKey) -> Option<Value> {
        let bytes = self.cache.get(self.binding.name, &key.to_string()).await?;
        match serde_json::from_slice(&bytes) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!(
                    resource = self.binding.name,
                    key = %key,
                    error = %e,
                    "ignoring unreadable cache entry"
                );
                None
            }
        }
    }
}

/// An empty-string key counts as absent: insert rejects it, replace keeps
/// the current key.
fn clear_blank_key(table: &TableSchema, row: &mut Value) {
    if let Some(slot) = row.get_mut(table.key) {
        if slot.as_str().is_some_and(str::is_empty) {
            *slot = Value::Null;
        }
    }
}

type ExpandFuture<'a> = Pin<Box<dyn Future<Output = StorageResult<Value>> + Send + 'a>>;

/// Embeds child rows under each relation of `table`, recursively.
fn expand_children<'a>(
    store: &'a dyn RecordStore,
    table: &'static TableSchema,
    mut row: Value,
) -> ExpandFuture<'a> {
    Box::pin(async move {
        if table.children.is_empty() {
            return Ok(row);
        }
        let Some(key) = row.get(table.key).cloned() else {
            return Ok(row);
        };

        for relation in table.children {
            let child = schema::table(relation.table)
                .ok_or_else(|| StorageError::internal(format!("unknown table {}", relation.table)))?;
            let rows = store
                .list_by(child, relation.column, &key, &ListParams::unbounded())
                .await?;

            let mut embedded = Vec::with_capacity(rows.len());
            for child_row in rows {
                embedded.push(expand_children(store, child, child_row).await?);
            }
            if let Value::Object(fields) = &mut row {
                fields.insert(relation.field.to_string(), Value::Array(embedded));
            }
        }
        Ok(row)
    })
}
