//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use sealbox::{FileClient, FileServer, LocalTransport, SealboxConfig};
use sealbox_core::{
    cipher, FileId, PermissionEntry, Principal, SymmetricKey, TransferCodec, TransportForm,
};
use sealbox_store::{MemoryStore, NewFile, Store};

/// Fixed clock for deterministic expiry tests (2023-11-14T22:13:20Z).
pub const T0: i64 = 1_700_000_000_000;

/// A server over an in-memory store plus a cast of principals.
pub struct TestFixture {
    pub server: Arc<FileServer<MemoryStore>>,
    /// Regular user who owns the files created by [`TestFixture::seed_file`].
    pub owner: Principal,
    /// Regular user with no access until granted.
    pub other: Principal,
    pub admin: Principal,
    pub guest: Principal,
}

impl TestFixture {
    /// Create a fixture with the default config.
    pub fn new() -> Self {
        Self::with_config(SealboxConfig::default())
    }

    pub fn with_config(config: SealboxConfig) -> Self {
        Self {
            server: Arc::new(FileServer::new(Arc::new(MemoryStore::new()), config)),
            owner: Principal::user(1),
            other: Principal::user(2),
            admin: Principal::admin(90),
            guest: Principal::guest(99),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        self.server.store()
    }

    /// A client acting as `principal` over an in-process transport.
    pub fn client(&self, principal: Principal) -> FileClient<LocalTransport<MemoryStore>> {
        FileClient::new(LocalTransport::new(self.server.clone()), principal)
    }

    /// Store an encrypted file owned by `self.owner` without going through a
    /// client.
    pub async fn seed_file(&self, filename: &str, plaintext: &[u8], uploaded_at: i64) -> FileId {
        let key = SymmetricKey::generate().expect("os randomness");
        self.store()
            .insert_file(NewFile {
                owner_id: self.owner.user_id,
                filename: filename.to_string(),
                file_type: sealbox_core::file_type_for(filename).to_string(),
                envelope: cipher::encrypt(plaintext, &key).expect("encrypt"),
                key_material: key.export(),
                uploaded_at,
            })
            .await
            .expect("insert file")
            .id
    }

    /// Replace a file's entries as the owner.
    pub async fn grant(&self, file_id: FileId, entries: &[PermissionEntry]) {
        self.server
            .registry()
            .replace(file_id, &self.owner, entries)
            .await
            .expect("grant");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Encrypt `plaintext` under a fresh key and pack it as an upload form.
pub fn upload_form(plaintext: &[u8]) -> TransportForm {
    let key = SymmetricKey::generate().expect("os randomness");
    let envelope = cipher::encrypt(plaintext, &key).expect("encrypt");
    TransferCodec::upload().pack(&envelope, &key.export())
}
