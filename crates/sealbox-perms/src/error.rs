//! Error types for the permissions module.

use sealbox_core::{FileId, UserId};
use sealbox_store::StoreError;
use thiserror::Error;

/// Errors that can occur during permission and share-link operations.
#[derive(Debug, Error)]
pub enum PermsError {
    /// The principal may not perform this action on this file.
    #[error("permission denied: user {user_id} on file {file_id}: {reason}")]
    Denied {
        user_id: UserId,
        file_id: FileId,
        reason: &'static str,
    },

    /// No file with this id exists.
    #[error("file not found: {0}")]
    FileNotFound(FileId),

    /// Share-link lifetime outside {30, 60, 120} seconds.
    #[error("invalid share link ttl: {0}s (allowed: 30, 60, 120)")]
    InvalidTtl(u64),

    /// The share link exists but its lifetime has passed.
    #[error("share link expired at {expired_at}")]
    LinkExpired { expired_at: i64 },

    /// No share link with this token exists.
    #[error("share link not found")]
    LinkNotFound,

    /// The same user appears twice in one permission batch.
    #[error("duplicate permission entry for user {0}")]
    DuplicateEntry(UserId),

    /// An entry in a permission batch targets a different file.
    #[error("invalid permission entry: {0}")]
    InvalidEntry(String),

    /// Token randomness could not be drawn.
    #[error("randomness unavailable: {0}")]
    Randomness(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
