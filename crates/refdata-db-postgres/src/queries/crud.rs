//! Row-level queries driven by the table catalog.
//!
//! Rows cross the wire as `jsonb`: writes go through
//! `jsonb_populate_record(NULL::<table>, $n)` so PostgreSQL does the column
//! typing, and reads come back as `to_jsonb(row)`.

use refdata_core::{KeyKind, RecordKey, TableSchema};
use refdata_storage::{ListParams, StorageError};
use serde_json::{Map, Value};
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::PgExecutor;

use crate::error::{map_read_error, map_write_error};

fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

fn column_list<'a>(columns: impl Iterator<Item = &'a str>) -> String {
    columns.map(quote).collect::<Vec<_>>().join(", ")
}

/// SQL type the bound key text is cast to.
fn key_cast(kind: KeyKind) -> &'static str {
    match kind {
        KeyKind::Text => "text",
        KeyKind::Code2 => "bpchar",
        KeyKind::Uuid => "uuid",
        KeyKind::Serial => "bigint",
    }
}

fn key_predicate(table: &TableSchema, placeholder: &str) -> String {
    format!(
        "r.{} = {placeholder}::{}",
        quote(table.key),
        key_cast(table.key_kind)
    )
}

/// Columns written on insert. Serial keys are left to the sequence.
fn insert_columns(table: &TableSchema) -> Vec<&'static str> {
    if table.key_kind.is_generated() {
        table.value_columns().collect()
    } else {
        table.columns.to_vec()
    }
}

fn ensure_object(table: &TableSchema, row: &Value) -> Result<(), StorageError> {
    if row.is_object() {
        Ok(())
    } else {
        Err(StorageError::invalid_record(format!(
            "row for {} must be a JSON object",
            table.name
        )))
    }
}

fn describe_key(table: &TableSchema, row: &Value) -> String {
    table
        .key_of(row)
        .map(|key| key.to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Builds the row written by `replace`: every column from `row`, with the
/// key kept unless `row` supplies a new one.
fn replacement_row(table: &TableSchema, key: &RecordKey, row: &Value) -> Value {
    let mut record: Map<String, Value> = table.project(row);
    if table.key_kind.is_generated() || table.key_of(row).is_none() {
        record.insert(table.key.to_string(), key.to_value());
    }
    Value::Object(record)
}

fn window(params: &ListParams) -> (i64, i64) {
    (
        i64::try_from(params.skip).unwrap_or(i64::MAX),
        i64::try_from(params.limit).unwrap_or(i64::MAX),
    )
}

pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    table: &'static TableSchema,
    row: &Value,
) -> Result<Value, StorageError> {
    ensure_object(table, row)?;
    let columns = column_list(insert_columns(table).into_iter());
    let name = quote(table.name);
    let sql = format!(
        "INSERT INTO {name} AS r ({columns}) \
         SELECT {columns} FROM jsonb_populate_record(NULL::{name}, $1) \
         RETURNING to_jsonb(r)"
    );

    query_scalar::<_, Value>(&sql)
        .bind(row)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, table.name, &describe_key(table, row)))
}

pub async fn fetch<'e>(
    executor: impl PgExecutor<'e>,
    table: &'static TableSchema,
    key: &RecordKey,
) -> Result<Option<Value>, StorageError> {
    let sql = format!(
        "SELECT to_jsonb(r) FROM {} AS r WHERE {}",
        quote(table.name),
        key_predicate(table, "$1")
    );

    query_scalar::<_, Value>(&sql)
        .bind(key.to_string())
        .fetch_optional(executor)
        .await
        .map_err(map_read_error)
}

pub async fn replace<'e>(
    executor: impl PgExecutor<'e>,
    table: &'static TableSchema,
    key: &RecordKey,
    row: &Value,
) -> Result<Value, StorageError> {
    ensure_object(table, row)?;
    let row = replacement_row(table, key, row);
    let columns = column_list(insert_columns(table).into_iter());
    let name = quote(table.name);
    let sql = format!(
        "UPDATE {name} AS r SET ({columns}) = \
         (SELECT {columns} FROM jsonb_populate_record(NULL::{name}, $2)) \
         WHERE {} RETURNING to_jsonb(r)",
        key_predicate(table, "$1")
    );

    query_scalar::<_, Value>(&sql)
        .bind(key.to_string())
        .bind(&row)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(e, table.name, &describe_key(table, &row)))?
        .ok_or_else(|| StorageError::not_found(table.name, key))
}

pub async fn remove<'e>(
    executor: impl PgExecutor<'e>,
    table: &'static TableSchema,
    key: &RecordKey,
) -> Result<(), StorageError> {
    let sql = format!(
        "DELETE FROM {} AS r WHERE {}",
        quote(table.name),
        key_predicate(table, "$1")
    );

    let result = query(&sql)
        .bind(key.to_string())
        .execute(executor)
        .await
        .map_err(|e| map_write_error(e, table.name, &key.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found(table.name, key));
    }
    Ok(())
}

pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    table: &'static TableSchema,
    params: &ListParams,
) -> Result<Vec<Value>, StorageError> {
    let sql = format!(
        "SELECT to_jsonb(r) FROM {} AS r OFFSET $1 LIMIT $2",
        quote(table.name)
    );
    let (skip, limit) = window(params);

    query_scalar::<_, Value>(&sql)
        .bind(skip)
        .bind(limit)
        .fetch_all(executor)
        .await
        .map_err(map_read_error)
}

pub async fn list_by<'e>(
    executor: impl PgExecutor<'e>,
    table: &'static TableSchema,
    column: &str,
    value: &Value,
    params: &ListParams,
) -> Result<Vec<Value>, StorageError> {
    if !table.has_column(column) {
        return Err(StorageError::invalid_record(format!(
            "{} has no column {column}",
            table.name
        )));
    }
    let name = quote(table.name);
    let ident = quote(column);
    let sql = format!(
        "SELECT to_jsonb(r) FROM {name} AS r \
         WHERE r.{ident} = (SELECT {ident} FROM jsonb_populate_record(NULL::{name}, $1)) \
         OFFSET $2 LIMIT $3"
    );
    let mut probe = Map::new();
    probe.insert(column.to_string(), value.clone());
    let (skip, limit) = window(params);

    query_scalar::<_, Value>(&sql)
        .bind(Value::Object(probe))
        .bind(skip)
        .bind(limit)
        .fetch_all(executor)
        .await
        .map_err(map_read_error)
}
