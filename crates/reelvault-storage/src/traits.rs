//! Storage abstraction trait
//!
//! This module defines the Storage trait implemented by the storage engine.
//! The media orchestrator only sees this trait, which keeps it testable with
//! substitute backends.

use crate::validation::{UploadCandidate, ValidationError};
use reelvault_core::AppError;
use thiserror::Error;

/// Storage operation errors
///
/// Messages carry the operation and the object key, never the resolved
/// filesystem path.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Object key escapes the storage root during {operation}")]
    PathEscape { operation: &'static str },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage I/O failed during {operation} of '{key}': {source}")]
    Io {
        operation: &'static str,
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Validation(e @ ValidationError::FileTooLarge { .. }) => {
                AppError::PayloadTooLarge(e.to_string())
            }
            StorageError::Validation(e) => AppError::InvalidInput(e.to_string()),
            StorageError::PathEscape { operation } => AppError::InvalidObjectKey { operation },
            StorageError::NotFound(_) => AppError::NotFound("Stored object not found".to_string()),
            StorageError::ConfigError(msg) => AppError::Configuration(msg),
            StorageError::Io {
                operation, source, ..
            } => AppError::StorageWithSource { operation, source },
        }
    }
}

/// Storage abstraction trait
///
/// All operations are blocking and bounded by filesystem latency. Keys are
/// the strings returned by [`Storage::store`].
pub trait Storage: Send + Sync {
    /// Ensure the storage root exists and is writable. Idempotent.
    fn initialize(&self) -> StorageResult<()>;

    /// Check an upload against the configured size limit and extension
    /// allow-list without touching the filesystem.
    fn validate(&self, candidate: &UploadCandidate<'_>) -> Result<(), ValidationError>;

    /// Validate and persist `content`, returning the generated object key.
    ///
    /// Never overwrites: if an object already exists under the generated
    /// key, the store fails with [`StorageError::Io`] and the existing
    /// object is left untouched.
    fn store(&self, content: &[u8], original_name: Option<&str>) -> StorageResult<String>;

    /// Read the whole object.
    fn load(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Remove the object. Succeeds when the key is empty or already gone.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Whether the object exists. Never fails; rejected keys report `false`.
    fn exists(&self, key: &str) -> bool;

    /// MIME type of the object, detected from content with an extension fallback.
    fn content_type(&self, key: &str) -> StorageResult<String>;

    /// Size in bytes of the object.
    fn content_length(&self, key: &str) -> StorageResult<u64>;
}
