//! Cache error types.

use std::io;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored value does not have the shape of a cache entry
    #[error("Corrupt cache entry for {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Tempfile persist error
    #[cfg(feature = "native")]
    #[error("Failed to persist temp file: {0}")]
    TempfilePersist(#[from] tempfile::PersistError),
}

impl CacheError {
    /// Whether the stored value itself is unusable, as opposed to the backend
    /// failing to reach it.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, CacheError::Corrupt { .. } | CacheError::Json(_))
    }
}
