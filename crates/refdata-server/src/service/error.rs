use axum::http::StatusCode;
use refdata_api::ApiError;
use refdata_storage::StorageError;
use thiserror::Error;

/// Failures of a resource service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Duplicate key or any other integrity violation raised by the store.
    #[error("conflict: {0}")]
    Conflict(StorageError),
    #[error("record not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(StorageError),
    #[error("file storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record does not match its shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::NotFound,
            err if err.is_integrity_violation() => Self::Conflict(err),
            StorageError::InvalidRecord { message } => Self::Validation(message),
            err => Self::Storage(err),
        }
    }
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Translates into the HTTP error for resource `label`.
    ///
    /// `missing` is the status used for [`ServiceError::NotFound`].
    pub fn into_api_error(self, label: &str, missing: StatusCode) -> ApiError {
        match self {
            Self::Conflict(cause) => {
                tracing::debug!(error = %cause, "write rejected by the store");
                ApiError::bad_request(format!("{label} with this ID already exists"))
            }
            Self::NotFound => ApiError::missing(missing, format!("{label} not found")),
            Self::Validation(message) => ApiError::bad_request(message),
            other => {
                tracing::error!(error = %other, resource = label, "request failed");
                ApiError::internal("Internal server error")
            }
        }
    }
}
