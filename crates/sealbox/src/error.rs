//! Error types for Sealbox.

use sealbox_core::{CoreError, FileId, UserId};
use sealbox_perms::PermsError;
use sealbox_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Sealbox operations.
#[derive(Debug, Error)]
pub enum SealboxError {
    /// Key, cipher or codec error.
    #[error("crypto error: {0}")]
    Core(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Permission or share-link error.
    #[error("permission error: {0}")]
    Permission(#[from] PermsError),

    /// The transport failed to deliver a request or response.
    #[error("network error: {0}")]
    Network(String),

    /// The principal's role may not upload.
    #[error("user {0} is not allowed to upload")]
    UploadNotAllowed(UserId),

    /// The upload body exceeds the configured limit.
    #[error("payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// No stored file with this id.
    #[error("file not found: {0}")]
    FileNotFound(FileId),

    /// A request was missing something it needs.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SealboxError {
    /// Whether retrying the same call could succeed.
    ///
    /// Only transport failures qualify. Retries are up to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SealboxError::Network(_))
    }
}

/// Result type for Sealbox operations.
pub type Result<T> = std::result::Result<T, SealboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_is_retryable() {
        assert!(SealboxError::Network("connection reset".into()).is_retryable());

        let others = [
            SealboxError::Core(CoreError::AuthenticationFailure),
            SealboxError::Permission(PermsError::LinkNotFound),
            SealboxError::UploadNotAllowed(UserId(3)),
            SealboxError::PayloadTooLarge { size: 2, limit: 1 },
            SealboxError::FileNotFound(FileId(1)),
            SealboxError::InvalidRequest("no filename".into()),
        ];
        for err in others {
            assert!(!err.is_retryable(), "{} should not be retryable", err);
        }
    }
}
