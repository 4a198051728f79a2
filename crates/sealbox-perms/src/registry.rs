//! The permission registry: who may see or download which file.
//!
//! Owners and admins always hold `downloadview`. Everybody else holds exactly
//! what the file's entry set says, or nothing.

use std::collections::HashSet;
use std::sync::Arc;

use sealbox_core::{AccessType, FileId, FileMetadata, PermissionEntry, Principal};
use sealbox_store::Store;

use crate::error::{PermsError, Result};

/// Gatekeeper over the permission entries held by a [`Store`].
///
/// Holds no cached state; every check reads the store, so a replaced entry set
/// takes effect on the next call.
pub struct PermissionRegistry<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> Clone for PermissionRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Store + ?Sized> PermissionRegistry<S> {
    /// Create a registry over a shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Get the store reference.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Load a file's metadata or fail with `FileNotFound`.
    pub async fn file(&self, file_id: FileId) -> Result<FileMetadata> {
        self.store
            .get_file_metadata(file_id)
            .await?
            .ok_or(PermsError::FileNotFound(file_id))
    }

    /// All entries granted on a file. Empty when nothing has been granted.
    pub async fn list(&self, file_id: FileId) -> Result<Vec<PermissionEntry>> {
        self.file(file_id).await?;
        Ok(self.store.get_permissions(file_id).await?)
    }

    /// Replace the whole entry set of a file.
    ///
    /// Only the owner or an admin may do this. The batch is checked in full
    /// before anything is written, and the store swaps the set atomically.
    /// Replacing with the current set is a no-op.
    ///
    /// # Errors
    /// - `FileNotFound` if the file does not exist.
    /// - `Denied` if `caller` is neither owner nor admin.
    /// - `InvalidEntry` if an entry names another file.
    /// - `DuplicateEntry` if a user appears twice.
    pub async fn replace(
        &self,
        file_id: FileId,
        caller: &Principal,
        entries: &[PermissionEntry],
    ) -> Result<()> {
        let file = self.file(file_id).await?;
        if !caller.is_owner_or_admin(&file) {
            tracing::warn!(user = %caller.user_id, file_id = %file_id, "permission edit refused");
            return Err(PermsError::Denied {
                user_id: caller.user_id,
                file_id,
                reason: "only the owner or an admin may edit permissions",
            });
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in entries {
            if entry.file_id != file_id {
                return Err(PermsError::InvalidEntry(format!(
                    "entry for user {} targets file {}, expected {}",
                    entry.user_id, entry.file_id, file_id
                )));
            }
            if !seen.insert(entry.user_id) {
                return Err(PermsError::DuplicateEntry(entry.user_id));
            }
        }

        self.store.replace_permissions(file_id, entries).await?;
        tracing::info!(file_id = %file_id, by = %caller.user_id, count = entries.len(), "permissions replaced");
        Ok(())
    }

    /// The access level `principal` holds on a file.
    ///
    /// # Errors
    /// - `FileNotFound` if the file does not exist.
    /// - `Denied` if the principal holds no entry and is neither owner nor admin.
    pub async fn authorize(&self, file_id: FileId, principal: &Principal) -> Result<AccessType> {
        let file = self.file(file_id).await?;
        if principal.is_owner_or_admin(&file) {
            return Ok(AccessType::DownloadView);
        }

        self.store
            .get_permission(file_id, principal.user_id)
            .await?
            .ok_or(PermsError::Denied {
                user_id: principal.user_id,
                file_id,
                reason: "no access granted",
            })
    }

    /// Like [`authorize`](Self::authorize) but requires `downloadview`.
    pub async fn authorize_download(
        &self,
        file_id: FileId,
        principal: &Principal,
    ) -> Result<AccessType> {
        let access = self.authorize(file_id, principal).await?;
        if !access.permits_download() {
            return Err(PermsError::Denied {
                user_id: principal.user_id,
                file_id,
                reason: "view access does not permit download",
            });
        }
        Ok(access)
    }
}
