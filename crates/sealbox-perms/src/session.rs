//! Short-lived permission edits.
//!
//! A [`PermissionEditSession`] is a local copy of one file's entry set. Edits
//! touch only the copy; [`save`](PermissionEditSession::save) hands the whole
//! set to [`PermissionRegistry::replace`]. Dropping the session discards it.

use std::collections::BTreeMap;

use sealbox_core::{AccessType, FileId, PermissionEntry, Principal, UserId};
use sealbox_store::Store;

use crate::error::Result;
use crate::registry::PermissionRegistry;

/// Working copy of a file's permission entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEditSession {
    file_id: FileId,
    loaded: BTreeMap<UserId, AccessType>,
    working: BTreeMap<UserId, AccessType>,
}

impl PermissionEditSession {
    /// Start a session from the file's current entries.
    pub async fn load<S: Store + ?Sized>(
        registry: &PermissionRegistry<S>,
        file_id: FileId,
    ) -> Result<Self> {
        let loaded: BTreeMap<UserId, AccessType> = registry
            .list(file_id)
            .await?
            .into_iter()
            .map(|e| (e.user_id, e.access_type))
            .collect();

        Ok(Self {
            file_id,
            working: loaded.clone(),
            loaded,
        })
    }

    /// The file being edited.
    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    /// Grant or change a user's access.
    pub fn set(&mut self, user: UserId, access: AccessType) {
        self.working.insert(user, access);
    }

    /// Drop a user's entry. Returns what they had.
    pub fn remove(&mut self, user: UserId) -> Option<AccessType> {
        self.working.remove(&user)
    }

    /// Current access of a user in the working copy.
    pub fn get(&self, user: UserId) -> Option<AccessType> {
        self.working.get(&user).copied()
    }

    /// The working copy as entries, ordered by user id.
    pub fn entries(&self) -> Vec<PermissionEntry> {
        self.working
            .iter()
            .map(|(&user, &access)| PermissionEntry::new(self.file_id, user, access))
            .collect()
    }

    /// Whether the working copy differs from what was loaded.
    pub fn is_dirty(&self) -> bool {
        self.working != self.loaded
    }

    /// Write the working copy back as a full replace.
    pub async fn save<S: Store + ?Sized>(
        self,
        registry: &PermissionRegistry<S>,
        caller: &Principal,
    ) -> Result<()> {
        registry.replace(self.file_id, caller, &self.entries()).await
    }
}
