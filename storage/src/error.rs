//! Storage error types.
//!
//! Used by the pool manager and repository; message-logger sorts them into setup vs. persistence failures.

use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unsupported database URL (expected mysql:// or sqlite:): {0}")]
    UnsupportedUrl(String),
    #[error("Connection error: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("Liveness check failed: SELECT 1 returned {0}")]
    LivenessCheck(i64),
    #[error("Schema error: {0}")]
    Schema(#[source] sqlx::Error),
    #[error("Duplicate message_id: {0}")]
    DuplicateMessage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// True when the insert hit the `message_id` primary key.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StorageError::DuplicateMessage(_))
    }
}
