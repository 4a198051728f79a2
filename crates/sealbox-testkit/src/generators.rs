//! Proptest generators for property-based testing.

use proptest::prelude::*;

use sealbox_core::{
    AccessType, FileId, KeyMaterial, Nonce, PermissionEntry, Principal, Role, ShareTtl,
    SymmetricKey, UserId, KEY_SIZE, NONCE_SIZE,
};

/// Generate plaintext of up to `max_len` bytes, including empty.
pub fn plaintext(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a key from random bytes.
pub fn symmetric_key() -> impl Strategy<Value = SymmetricKey> {
    any::<[u8; KEY_SIZE]>().prop_map(|bytes| KeyMaterial(bytes).to_key())
}

/// Generate a nonce.
pub fn nonce() -> impl Strategy<Value = Nonce> {
    any::<[u8; NONCE_SIZE]>().prop_map(Nonce)
}

/// Generate a user id.
pub fn user_id() -> impl Strategy<Value = UserId> {
    (1i64..1_000).prop_map(UserId)
}

/// Generate a role.
pub fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Admin), Just(Role::Guest)]
}

/// Generate a principal.
pub fn principal() -> impl Strategy<Value = Principal> {
    (user_id(), role()).prop_map(|(user_id, role)| Principal { user_id, role })
}

/// Generate an access type.
pub fn access_type() -> impl Strategy<Value = AccessType> {
    prop_oneof![Just(AccessType::View), Just(AccessType::DownloadView)]
}

/// Generate one of the allowed share-link lifetimes.
pub fn share_ttl() -> impl Strategy<Value = ShareTtl> {
    prop::sample::select(ShareTtl::ALL.to_vec())
}

/// Generate a TTL in seconds that is not 30, 60 or 120.
pub fn invalid_ttl_secs() -> impl Strategy<Value = u64> {
    any::<u64>().prop_filter("allowed ttl", |s| ShareTtl::try_from(*s).is_err())
}

/// Generate a valid permission batch for `file_id`: at most one entry per user.
pub fn permission_batch(file_id: FileId, max_len: usize) -> impl Strategy<Value = Vec<PermissionEntry>> {
    prop::collection::btree_map(user_id(), access_type(), 0..=max_len).prop_map(move |acl| {
        acl.into_iter()
            .map(|(user, access)| PermissionEntry::new(file_id, user, access))
            .collect()
    })
}

/// Generate a filename with one of the known extensions or none.
pub fn filename() -> impl Strategy<Value = String> {
    (
        "[a-z][a-z0-9_-]{0,15}",
        prop::sample::select(vec!["", ".pdf", ".doc", ".docx", ".jpg", ".jpeg", ".png", ".txt", ".zip", ".bin"]),
    )
        .prop_map(|(stem, ext)| format!("{}{}", stem, ext))
}
