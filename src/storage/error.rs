//! Storage error types
//!
//! Defines all errors that can occur in the storage layer.

use crate::storage::types::ValidationError;
use thiserror::Error;

/// Errors raised by the key/value store
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Key contains characters that cannot be used as a file name
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by the widget repository
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The widget was refused; nothing changed
    #[error("Invalid widget: {0}")]
    Invalid(#[from] ValidationError),

    /// The snapshot could not be written; the in-memory change was rolled back
    #[error("Failed to persist widgets: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::InvalidKey("../etc".to_string());
        assert_eq!(err.to_string(), "Invalid storage key: ../etc");

        let err = RepositoryError::Invalid(ValidationError::MissingTitle);
        assert_eq!(err.to_string(), "Invalid widget: Widget title is required");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let storage_err: StorageError = io_err.into();
        assert!(matches!(storage_err, StorageError::Io(_)));

        let repo_err: RepositoryError = storage_err.into();
        assert!(matches!(repo_err, RepositoryError::Storage(StorageError::Io(_))));
    }
}
