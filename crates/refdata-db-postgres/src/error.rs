//! Error types for the PostgreSQL record store.

use refdata_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// unique_violation
pub const PG_UNIQUE_VIOLATION: &str = "23505";
/// foreign_key_violation
pub const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
/// not_null_violation
pub const PG_NOT_NULL_VIOLATION: &str = "23502";
/// string_data_right_truncation, raised for `VARCHAR(2)` overflow
pub const PG_STRING_TOO_LONG: &str = "22001";

/// Returns the SQLSTATE of a database error, if any.
pub fn pg_error_code(err: &SqlxError) -> Option<String> {
    match err {
        SqlxError::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// Checks if a sqlx error has a specific PostgreSQL error code.
pub fn has_pg_error_code(err: &SqlxError, code: &str) -> bool {
    pg_error_code(err).as_deref() == Some(code)
}

/// Maps a failed write on `table` to a storage error.
///
/// `key` names the row being written and ends up in `AlreadyExists`.
pub fn map_write_error(err: SqlxError, table: &str, key: &str) -> StorageError {
    match pg_error_code(&err).as_deref() {
        Some(PG_UNIQUE_VIOLATION) => StorageError::already_exists(table, key),
        Some(PG_FOREIGN_KEY_VIOLATION | PG_NOT_NULL_VIOLATION | PG_STRING_TOO_LONG) => {
            StorageError::constraint_violation(table, err.to_string())
        }
        // data_exception class: malformed dates, numbers, uuids
        Some(code) if code.starts_with("22") => StorageError::invalid_record(err.to_string()),
        _ => map_read_error(err),
    }
}

/// Maps a failed read to a storage error.
pub fn map_read_error(err: SqlxError) -> StorageError {
    match err {
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) | SqlxError::Tls(_) => {
            StorageError::connection_error(err.to_string())
        }
        other => StorageError::internal(other.to_string()),
    }
}

/// Errors raised while setting up the PostgreSQL backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] SqlxError),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) => StorageError::connection_error(e.to_string()),
            PostgresError::Migration(e) => StorageError::internal(format!("Migration error: {e}")),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
        }
    }
}

/// Result type alias for PostgreSQL setup operations.
pub type Result<T> = std::result::Result<T, PostgresError>;
