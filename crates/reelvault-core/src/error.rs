//! Error types module
//!
//! All failures that cross the core boundary are unified under `AppError`.
//! Each variant self-describes how it should be presented through
//! `ErrorMetadata`, so the transport layer can build a response without
//! inspecting messages. Client-facing messages never carry filesystem paths.

use std::io;
use uuid::Uuid;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected requests worth noticing, like path escapes
    Warn,
    /// Error level - for unexpected failures and consistency violations
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "OBJECT_MISSING")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from untrusted callers
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    /// A storage key resolved outside the storage root.
    #[error("Invalid object key during {operation}")]
    InvalidObjectKey { operation: &'static str },

    #[error("Not found: {0}")]
    NotFound(String),

    /// The record references an object the storage root does not hold.
    #[error("Stored object {key} for video {video_id} is missing")]
    ObjectMissing { video_id: Uuid, key: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error during {operation}")]
    StorageWithSource {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Repository(format!("JSON error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidObjectKey { .. } => (
            400,
            "INVALID_OBJECT_KEY",
            false,
            None,
            true,
            LogLevel::Warn,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::ObjectMissing { .. } => (
            404,
            "OBJECT_MISSING",
            false,
            Some("Re-upload the video file"),
            true,
            LogLevel::Error,
        ),
        AppError::Configuration(_) => (
            500,
            "CONFIGURATION_ERROR",
            false,
            None,
            true,
            LogLevel::Error,
        ),
        AppError::StorageWithSource { .. } => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Repository(_) => (
            500,
            "REPOSITORY_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// True for every "not found" flavour, including a missing stored object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_) | AppError::ObjectMissing { .. })
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::InvalidObjectKey { .. } => "Invalid file reference".to_string(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::ObjectMissing { .. } => "Video file not found".to_string(),
            AppError::Configuration(_) => "Service is not configured".to_string(),
            AppError::StorageWithSource { .. } => "Failed to access storage".to_string(),
            AppError::Repository(_) => "Failed to access video catalog".to_string(),
        }
    }
}
