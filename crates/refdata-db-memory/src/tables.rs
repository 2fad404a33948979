//! Row storage and integrity rules shared by the store and its transactions.

use std::collections::HashMap;

use indexmap::IndexMap;
use refdata_core::{KeyKind, RecordKey, TableSchema, schema};
use refdata_storage::{ListParams, StorageError, StorageResult};
use serde_json::{Map, Value};

type Row = Map<String, Value>;

/// All tables of the catalog, each in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    rows: HashMap<&'static str, IndexMap<RecordKey, Row>>,
    sequences: HashMap<&'static str, i64>,
}

impl Tables {
    fn contains(&self, table: &str, key: &RecordKey) -> bool {
        self.rows
            .get(table)
            .is_some_and(|rows| rows.contains_key(key))
    }

    pub(crate) fn get(&self, table: &TableSchema, key: &RecordKey) -> Option<Value> {
        self.rows
            .get(table.name)
            .and_then(|rows| rows.get(key))
            .cloned()
            .map(Value::Object)
    }

    pub(crate) fn insert(&mut self, table: &'static TableSchema, row: &Value) -> StorageResult<Value> {
        let mut record = project_object(table, row)?;

        let key = if table.key_kind.is_generated() {
            let next = self.sequences.entry(table.name).or_insert(0);
            *next += 1;
            RecordKey::Int(*next)
        } else {
            read_key(table, &record).ok_or_else(|| {
                StorageError::constraint_violation(
                    table.name,
                    format!("null or malformed value in key column {}", table.key),
                )
            })?
        };
        record.insert(table.key.to_string(), key.to_value());

        if self.contains(table.name, &key) {
            return Err(StorageError::already_exists(table.name, &key));
        }
        self.check_row(table, &key, &record)?;

        self.rows.entry(table.name).or_default().insert(key, record.clone());
        Ok(Value::Object(record))
    }

    pub(crate) fn replace(
        &mut self,
        table: &'static TableSchema,
        key: &RecordKey,
        row: &Value,
    ) -> StorageResult<Value> {
        let position = self
            .rows
            .get(table.name)
            .and_then(|rows| rows.get_index_of(key))
            .ok_or_else(|| StorageError::not_found(table.name, key))?;

        let mut record = project_object(table, row)?;
        let new_key = if table.key_kind.is_generated() {
            key.clone()
        } else {
            read_key(table, &record).unwrap_or_else(|| key.clone())
        };
        record.insert(table.key.to_string(), new_key.to_value());

        if new_key != *key && self.contains(table.name, &new_key) {
            return Err(StorageError::already_exists(table.name, &new_key));
        }
        self.check_row(table, &new_key, &record)?;

        let rows = self.rows.entry(table.name).or_default();
        if new_key == *key {
            rows.insert(new_key, record.clone());
        } else {
            rows.shift_remove_index(position);
            rows.shift_insert(position, new_key.clone(), record.clone());
            self.cascade_rekey(table, key, &new_key);
        }
        Ok(Value::Object(record))
    }

    pub(crate) fn remove(&mut self, table: &'static TableSchema, key: &RecordKey) -> StorageResult<()> {
        if !self.contains(table.name, key) {
            return Err(StorageError::not_found(table.name, key));
        }
        self.cascade_delete(table, key);
        Ok(())
    }

    pub(crate) fn list(&self, table: &TableSchema, params: &ListParams) -> Vec<Value> {
        self.rows
            .get(table.name)
            .map(|rows| {
                rows.values()
                    .skip(params.skip)
                    .take(params.limit)
                    .cloned()
                    .map(Value::Object)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn list_by(
        &self,
        table: &TableSchema,
        column: &str,
        value: &Value,
        params: &ListParams,
    ) -> StorageResult<Vec<Value>> {
        if !table.has_column(column) {
            return Err(StorageError::invalid_record(format!(
                "{} has no column {column}",
                table.name
            )));
        }
        let Some(rows) = self.rows.get(table.name) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .values()
            .filter(|row| row.get(column) == Some(value))
            .skip(params.skip)
            .take(params.limit)
            .cloned()
            .map(Value::Object)
            .collect())
    }

    /// Key width and foreign key checks for a row about to be written.
    fn check_row(&self, table: &TableSchema, key: &RecordKey, record: &Row) -> StorageResult<()> {
        if let (KeyKind::Code2, RecordKey::Text(code)) = (table.key_kind, key) {
            if code.chars().count() > 2 {
                return Err(StorageError::constraint_violation(
                    table.name,
                    format!("value too long for type character varying(2): {code}"),
                ));
            }
        }

        for fk in table.foreign_keys {
            let value = record.get(fk.column).unwrap_or(&Value::Null);
            if value.is_null() {
                continue;
            }
            let parent = schema::table(fk.references).ok_or_else(|| {
                StorageError::internal(format!("unknown table {}", fk.references))
            })?;
            let exists = RecordKey::from_value(parent.key_kind, value)
                .is_some_and(|parent_key| self.contains(parent.name, &parent_key));
            if !exists {
                return Err(StorageError::constraint_violation(
                    table.name,
                    format!("{} = {value} is not present in {}", fk.column, parent.name),
                ));
            }
        }
        Ok(())
    }

    fn cascade_delete(&mut self, table: &'static TableSchema, key: &RecordKey) {
        if let Some(rows) = self.rows.get_mut(table.name) {
            rows.shift_remove(key);
        }
        let key_value = key.to_value();
        for (child, fk) in table.referenced_by() {
            let dependents: Vec<RecordKey> = self
                .rows
                .get(child.name)
                .map(|rows| {
                    rows.iter()
                        .filter(|(_, row)| row.get(fk.column) == Some(&key_value))
                        .map(|(k, _)| k.clone())
                        .collect()
                })
                .unwrap_or_default();
            for dependent in dependents {
                self.cascade_delete(child, &dependent);
            }
        }
    }

    fn cascade_rekey(&mut self, table: &'static TableSchema, old: &RecordKey, new: &RecordKey) {
        let (old, new) = (old.to_value(), new.to_value());
        for (child, fk) in table.referenced_by() {
            let Some(rows) = self.rows.get_mut(child.name) else {
                continue;
            };
            for row in rows.values_mut() {
                if row.get(fk.column) == Some(&old) {
                    row.insert(fk.column.to_string(), new.clone());
                }
            }
        }
    }
}

fn project_object(table: &TableSchema, row: &Value) -> StorageResult<Row> {
    if !row.is_object() {
        return Err(StorageError::invalid_record(format!(
            "row for {} must be a JSON object",
            table.name
        )));
    }
    Ok(table.project(row))
}

fn read_key(table: &TableSchema, record: &Row) -> Option<RecordKey> {
    record
        .get(table.key)
        .and_then(|value| RecordKey::from_value(table.key_kind, value))
}
