//! Time-limited share links.
//!
//! A link moves `Requested -> Issued -> Expired`. Issuing checks the TTL and
//! the caller, then persists the link. Validation never mutates anything:
//! expiry is decided from `now` alone. Several live links per file are fine.

use rand::rngs::OsRng;
use rand::RngCore;
use sealbox_core::{FileId, Principal, ShareLink, ShareToken, ShareTtl};
use sealbox_store::Store;

use crate::error::{PermsError, Result};
use crate::registry::PermissionRegistry;

/// Issues and validates share links for files held by a store.
pub struct ShareLinkIssuer<S: Store + ?Sized> {
    registry: PermissionRegistry<S>,
}

impl<S: Store + ?Sized> Clone for ShareLinkIssuer<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<S: Store + ?Sized> ShareLinkIssuer<S> {
    pub fn new(registry: PermissionRegistry<S>) -> Self {
        Self { registry }
    }

    /// Issue a new link for `file_id` that lives `ttl_seconds` from `now`.
    ///
    /// # Errors
    /// - `InvalidTtl` unless `ttl_seconds` is 30, 60 or 120.
    /// - `FileNotFound` if the file does not exist.
    /// - `Denied` if `caller` is neither owner nor admin.
    /// - `Randomness` if no token could be drawn.
    pub async fn issue(
        &self,
        file_id: FileId,
        caller: &Principal,
        ttl_seconds: u64,
        now: i64,
    ) -> Result<ShareLink> {
        let ttl = ShareTtl::try_from(ttl_seconds).map_err(|e| PermsError::InvalidTtl(e.0))?;

        let file = self.registry.file(file_id).await?;
        if !caller.is_owner_or_admin(&file) {
            tracing::warn!(user = %caller.user_id, file_id = %file_id, "share link refused");
            return Err(PermsError::Denied {
                user_id: caller.user_id,
                file_id,
                reason: "only the owner or an admin may share a file",
            });
        }

        let link = ShareLink::new(generate_token()?, file_id, now, ttl);
        self.registry.store().insert_share_link(&link).await?;

        tracing::info!(
            file_id = %file_id,
            by = %caller.user_id,
            ttl_secs = ttl.as_secs(),
            expires_at = link.expires_at,
            "share link issued"
        );
        Ok(link)
    }

    /// Resolve a token into a live link.
    ///
    /// # Errors
    /// - `LinkNotFound` for unknown tokens.
    /// - `LinkExpired` when `now > expires_at`.
    pub async fn validate(&self, token: &ShareToken, now: i64) -> Result<ShareLink> {
        let link = self
            .registry
            .store()
            .get_share_link(token)
            .await?
            .ok_or_else(|| {
                tracing::warn!(?token, "unknown share token");
                PermsError::LinkNotFound
            })?;

        if link.is_expired(now) {
            tracing::warn!(?token, expired_at = link.expires_at, now, "expired share link");
            return Err(PermsError::LinkExpired {
                expired_at: link.expires_at,
            });
        }

        Ok(link)
    }

    /// Every link issued for a file, live or not.
    pub async fn links_for(&self, file_id: FileId) -> Result<Vec<ShareLink>> {
        Ok(self.registry.store().list_share_links(file_id).await?)
    }
}

/// Public URL of a link: `{base}/access/{token}`.
pub fn share_url(base: &str, token: &ShareToken) -> String {
    format!("{}/access/{}", base.trim_end_matches('/'), token)
}

/// 32 lowercase hex characters: a BLAKE3 digest of fresh randomness, truncated.
fn generate_token() -> Result<ShareToken> {
    let mut seed = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut seed)
        .map_err(|e| PermsError::Randomness(e.to_string()))?;

    let digest = hex::encode(blake3::hash(&seed).as_bytes());
    Ok(ShareToken(digest[..ShareToken::LEN].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use sealbox_core::{cipher, SymmetricKey};
    use sealbox_store::{MemoryStore, NewFile};

    const OWNER: Principal = Principal::user(1);
    const T0: i64 = 1_700_000_000_000;

    async fn setup() -> (ShareLinkIssuer<MemoryStore>, FileId) {
        let store = Arc::new(MemoryStore::new());
        let key = SymmetricKey::generate().unwrap();
        let file = store
            .insert_file(NewFile {
                owner_id: OWNER.user_id,
                filename: "photo.png".into(),
                file_type: "image/png".into(),
                envelope: cipher::encrypt(b"png bytes", &key).unwrap(),
                key_material: key.export(),
                uploaded_at: 0,
            })
            .await
            .unwrap()
            .id;
        (ShareLinkIssuer::new(PermissionRegistry::new(store)), file)
    }

    #[tokio::test]
    async fn test_thirty_second_link_expires_at_31s() {
        let (issuer, file) = setup().await;
        let link = issuer.issue(file, &OWNER, 30, T0).await.unwrap();

        assert_eq!(link.expires_at, T0 + 30_000);
        assert!(issuer.validate(&link.token, T0 + 29_000).await.is_ok());
        assert!(issuer.validate(&link.token, T0 + 30_000).await.is_ok());
        assert!(matches!(
            issuer.validate(&link.token, T0 + 31_000).await,
            Err(PermsError::LinkExpired { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_ttl() {
        let (issuer, file) = setup().await;
        for ttl in [0, 45, 90, 3600] {
            assert!(matches!(
                issuer.issue(file, &OWNER, ttl, T0).await,
                Err(PermsError::InvalidTtl(t)) if t == ttl
            ));
        }
    }

    #[tokio::test]
    async fn test_invalid_ttl_checked_before_file() {
        let (issuer, _) = setup().await;
        assert!(matches!(
            issuer.issue(FileId(404), &OWNER, 45, T0).await,
            Err(PermsError::InvalidTtl(45))
        ));
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_may_issue() {
        let (issuer, file) = setup().await;

        assert!(matches!(
            issuer.issue(file, &Principal::user(2), 60, T0).await,
            Err(PermsError::Denied { .. })
        ));
        assert!(issuer.issue(file, &Principal::admin(50), 60, T0).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (issuer, _) = setup().await;
        let token = ShareToken::new("0".repeat(32));
        assert!(matches!(
            issuer.validate(&token, T0).await,
            Err(PermsError::LinkNotFound)
        ));
    }

    #[tokio::test]
    async fn test_multiple_links_coexist() {
        let (issuer, file) = setup().await;
        let a = issuer.issue(file, &OWNER, 30, T0).await.unwrap();
        let b = issuer.issue(file, &OWNER, 120, T0 + 1).await.unwrap();

        assert_ne!(a.token, b.token);
        assert!(issuer.validate(&a.token, T0 + 10_000).await.is_ok());
        assert!(issuer.validate(&b.token, T0 + 10_000).await.is_ok());
        assert_eq!(issuer.links_for(file).await.unwrap(), vec![a, b]);
    }

    #[test]
    fn test_token_shape_and_uniqueness() {
        let tokens: HashSet<String> = (0..1_000)
            .map(|_| generate_token().unwrap())
            .inspect(|t| assert!(t.is_well_formed(), "bad token {}", t))
            .map(|t| t.0)
            .collect();
        assert_eq!(tokens.len(), 1_000);
    }

    #[test]
    fn test_share_url() {
        let token = ShareToken::new("ab".repeat(16));
        assert_eq!(
            share_url("http://localhost:8000/api", &token),
            format!("http://localhost:8000/api/access/{}", "ab".repeat(16))
        );
        assert_eq!(
            share_url("https://files.example/", &token),
            format!("https://files.example/access/{}", "ab".repeat(16))
        );
    }
}
