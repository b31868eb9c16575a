//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No stored object exists for the logical name.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The logical name cannot be stored.
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
}

impl StorageError {
    /// Returns true if this error means the object does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::NotFound(_) => true,
            StorageError::Io(e) => e.kind() == io::ErrorKind::NotFound,
            StorageError::InvalidName(_) => false,
        }
    }
}
