//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be turned back into a domain value.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

impl StoreError {
    /// A lock guarding store state was poisoned by a panicking holder.
    pub(crate) fn poisoned(detail: impl std::fmt::Display) -> Self {
        StoreError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            Some(format!("lock poisoned: {}", detail)),
        ))
    }

    /// A blocking task did not run to completion.
    pub(crate) fn join_failed(detail: impl std::fmt::Display) -> Self {
        StoreError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("spawn_blocking failed: {}", detail)),
        ))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_failures_surface_as_database_errors() {
        for err in [StoreError::poisoned("files"), StoreError::join_failed("cancelled")] {
            assert!(matches!(err, StoreError::Database(_)));
        }
        assert!(StoreError::poisoned("files")
            .to_string()
            .contains("lock poisoned: files"));
    }
}
