//! Store trait: the abstract interface for file, permission and share-link
//! persistence.
//!
//! Implementations include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use sealbox_core::{
    AccessType, Envelope, FileId, FileMetadata, KeyMaterial, PermissionEntry, ShareLink,
    ShareToken, UserId,
};

use crate::error::Result;

/// An upload about to be persisted. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub owner_id: UserId,
    pub filename: String,
    pub file_type: String,
    pub envelope: Envelope,
    /// Stored exactly as received from the client.
    pub key_material: KeyMaterial,
    /// Unix ms.
    pub uploaded_at: i64,
}

/// A persisted upload: metadata, envelope and the key material that came with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub metadata: FileMetadata,
    pub envelope: Envelope,
    pub key_material: KeyMaterial,
}

/// The Store trait: async interface for Sealbox persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, `spawn_blocking` keeps the runtime free.
///
/// # Design Notes
///
/// - **Cascading delete**: deleting a file removes its permission entries and
///   share links in the same step.
/// - **Full replace**: `replace_permissions` swaps the whole entry set for a file
///   atomically. Readers see either the old set or the new one.
/// - **No validation**: ownership checks, duplicate detection and TTL rules live
///   in `sealbox-perms`; the store persists what it is given.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // File Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist an upload and return its metadata with the assigned id.
    async fn insert_file(&self, file: NewFile) -> Result<FileMetadata>;

    /// Get a file with its envelope and key material.
    async fn get_file(&self, id: FileId) -> Result<Option<StoredFile>>;

    /// Get only the metadata of a file.
    async fn get_file_metadata(&self, id: FileId) -> Result<Option<FileMetadata>>;

    /// Files owned by `user` or granted to them, newest first.
    async fn list_files_for(&self, user: UserId) -> Result<Vec<FileMetadata>>;

    /// Every file, newest first.
    async fn list_all_files(&self) -> Result<Vec<FileMetadata>>;

    /// Delete a file together with its permissions and share links.
    ///
    /// Returns `false` if no such file existed.
    async fn delete_file(&self, id: FileId) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Permission Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All entries for a file, ordered by user id.
    async fn get_permissions(&self, file: FileId) -> Result<Vec<PermissionEntry>>;

    /// The access type granted to `user` on `file`, if any.
    async fn get_permission(&self, file: FileId, user: UserId) -> Result<Option<AccessType>>;

    /// Atomically replace every entry for `file` with `entries`.
    async fn replace_permissions(&self, file: FileId, entries: &[PermissionEntry]) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Share Link Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist a newly issued link.
    async fn insert_share_link(&self, link: &ShareLink) -> Result<()>;

    /// Look up a link by token.
    async fn get_share_link(&self, token: &ShareToken) -> Result<Option<ShareLink>>;

    /// All links issued for a file, oldest first.
    async fn list_share_links(&self, file: FileId) -> Result<Vec<ShareLink>>;
}
