//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use sealbox_core::{
    AccessType, FileId, FileMetadata, PermissionEntry, ShareLink, ShareToken, UserId,
};

use crate::error::{Result, StoreError};
use crate::traits::{NewFile, Store, StoredFile};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Last assigned file id.
    last_id: i64,

    /// Files indexed by id.
    files: BTreeMap<FileId, StoredFile>,

    /// Permission entries: file -> (user -> access).
    permissions: HashMap<FileId, BTreeMap<UserId, AccessType>>,

    /// Share links indexed by token.
    share_links: HashMap<ShareToken, ShareLink>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(StoreError::poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(StoreError::poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(mut files: Vec<FileMetadata>) -> Vec<FileMetadata> {
    files.sort_by(|a, b| {
        b.uploaded_at
            .cmp(&a.uploaded_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    files
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_file(&self, file: NewFile) -> Result<FileMetadata> {
        let mut inner = self.write()?;

        inner.last_id += 1;
        let metadata = FileMetadata {
            id: FileId(inner.last_id),
            owner_id: file.owner_id,
            filename: file.filename,
            file_type: file.file_type,
            size: file.envelope.ciphertext.len() as u64,
            uploaded_at: file.uploaded_at,
        };

        inner.files.insert(
            metadata.id,
            StoredFile {
                metadata: metadata.clone(),
                envelope: file.envelope,
                key_material: file.key_material,
            },
        );

        Ok(metadata)
    }

    async fn get_file(&self, id: FileId) -> Result<Option<StoredFile>> {
        let inner = self.read()?;
        Ok(inner.files.get(&id).cloned())
    }

    async fn get_file_metadata(&self, id: FileId) -> Result<Option<FileMetadata>> {
        let inner = self.read()?;
        Ok(inner.files.get(&id).map(|f| f.metadata.clone()))
    }

    async fn list_files_for(&self, user: UserId) -> Result<Vec<FileMetadata>> {
        let inner = self.read()?;

        let files = inner
            .files
            .values()
            .filter(|f| {
                f.metadata.owner_id == user
                    || inner
                        .permissions
                        .get(&f.metadata.id)
                        .is_some_and(|acl| acl.contains_key(&user))
            })
            .map(|f| f.metadata.clone())
            .collect();

        Ok(newest_first(files))
    }

    async fn list_all_files(&self) -> Result<Vec<FileMetadata>> {
        let inner = self.read()?;
        let files = inner.files.values().map(|f| f.metadata.clone()).collect();
        Ok(newest_first(files))
    }

    async fn delete_file(&self, id: FileId) -> Result<bool> {
        let mut inner = self.write()?;

        inner.permissions.remove(&id);
        inner.share_links.retain(|_, link| link.file_id != id);
        Ok(inner.files.remove(&id).is_some())
    }

    async fn get_permissions(&self, file: FileId) -> Result<Vec<PermissionEntry>> {
        let inner = self.read()?;

        Ok(inner
            .permissions
            .get(&file)
            .map(|acl| {
                acl.iter()
                    .map(|(&user, &access)| PermissionEntry::new(file, user, access))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_permission(&self, file: FileId, user: UserId) -> Result<Option<AccessType>> {
        let inner = self.read()?;
        Ok(inner
            .permissions
            .get(&file)
            .and_then(|acl| acl.get(&user))
            .copied())
    }

    async fn replace_permissions(&self, file: FileId, entries: &[PermissionEntry]) -> Result<()> {
        // Build the new set first so a rejected batch leaves the old one intact.
        let mut acl = BTreeMap::new();
        for entry in entries {
            if acl.insert(entry.user_id, entry.access_type).is_some() {
                return Err(StoreError::InvalidData(format!(
                    "duplicate permission for user {} on file {}",
                    entry.user_id, file
                )));
            }
        }

        let mut inner = self.write()?;
        if acl.is_empty() {
            inner.permissions.remove(&file);
        } else {
            inner.permissions.insert(file, acl);
        }
        Ok(())
    }

    async fn insert_share_link(&self, link: &ShareLink) -> Result<()> {
        let mut inner = self.write()?;

        if inner.share_links.contains_key(&link.token) {
            return Err(StoreError::InvalidData(format!(
                "share token already exists: {:?}",
                link.token
            )));
        }
        inner.share_links.insert(link.token.clone(), link.clone());
        Ok(())
    }

    async fn get_share_link(&self, token: &ShareToken) -> Result<Option<ShareLink>> {
        let inner = self.read()?;
        Ok(inner.share_links.get(token).cloned())
    }

    async fn list_share_links(&self, file: FileId) -> Result<Vec<ShareLink>> {
        let inner = self.read()?;

        let mut links: Vec<ShareLink> = inner
            .share_links
            .values()
            .filter(|link| link.file_id == file)
            .cloned()
            .collect();
        links.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.token.as_str().cmp(b.token.as_str()))
        });
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealbox_core::{cipher, ShareTtl, SymmetricKey};

    fn new_file(owner: i64, name: &str, at: i64) -> NewFile {
        let key = SymmetricKey::generate().unwrap();
        NewFile {
            owner_id: UserId(owner),
            filename: name.to_string(),
            file_type: "text/plain".to_string(),
            envelope: cipher::encrypt(b"contents", &key).unwrap(),
            key_material: key.export(),
            uploaded_at: at,
        }
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();

        let a = store.insert_file(new_file(1, "a.txt", 0)).await.unwrap();
        let b = store.insert_file(new_file(1, "b.txt", 0)).await.unwrap();
        assert_ne!(a.id, b.id);

        let stored = store.get_file(a.id).await.unwrap().unwrap();
        assert_eq!(stored.metadata.filename, "a.txt");
        assert_eq!(stored.metadata.size, 8);
    }

    #[tokio::test]
    async fn test_memory_store_rejected_replace_keeps_old_set() {
        let store = MemoryStore::new();
        let file = store.insert_file(new_file(1, "a.txt", 0)).await.unwrap().id;
        let original = [PermissionEntry::new(file, UserId(2), AccessType::View)];
        store.replace_permissions(file, &original).await.unwrap();

        let dup = [
            PermissionEntry::new(file, UserId(3), AccessType::View),
            PermissionEntry::new(file, UserId(3), AccessType::View),
        ];
        assert!(store.replace_permissions(file, &dup).await.is_err());
        assert_eq!(store.get_permissions(file).await.unwrap(), original.to_vec());
    }

    #[tokio::test]
    async fn test_memory_store_delete_cascades() {
        let store = MemoryStore::new();
        let file = store.insert_file(new_file(1, "a.txt", 0)).await.unwrap().id;
        store
            .replace_permissions(file, &[PermissionEntry::new(file, UserId(2), AccessType::View)])
            .await
            .unwrap();
        let link = ShareLink::new(ShareToken::new("f".repeat(32)), file, 0, ShareTtl::Secs60);
        store.insert_share_link(&link).await.unwrap();

        assert!(store.delete_file(file).await.unwrap());
        assert!(store.get_permissions(file).await.unwrap().is_empty());
        assert!(store.get_share_link(&link.token).await.unwrap().is_none());
        assert!(store.list_files_for(UserId(2)).await.unwrap().is_empty());
    }
}
