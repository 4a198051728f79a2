//! The file server: accepts encrypted uploads and serves gated downloads.
//!
//! The server never encrypts. It stores the envelope and key material exactly
//! as the client sent them, and hands both back to any principal the
//! permission registry lets through. The one place it decrypts is share-link
//! access, where the recipient has no client pipeline.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use sealbox_core::{
    file_type_for, FileId, Principal, Role, ShareToken, TransferCodec, TransportForm,
};
use sealbox_perms::{share_url, PermissionRegistry, PermsError, ShareLinkIssuer};
use sealbox_store::{NewFile, Store};

use crate::api::{
    format_bytes, DeleteResponse, FileListing, PermissionsResponse, PermissionsUpdate,
    ShareAccessResponse, ShareLinkRequest, ShareLinkResponse, UploadRequest, UploadResponse,
    ORIGINAL_FILENAME_HEADER,
};
use crate::config::SealboxConfig;
use crate::error::{Result, SealboxError};

/// Server side of Sealbox.
///
/// Every gated operation takes the acting [`Principal`] explicitly. Operations
/// that depend on time take `now` in Unix milliseconds.
pub struct FileServer<S: Store + ?Sized> {
    store: Arc<S>,
    registry: PermissionRegistry<S>,
    issuer: ShareLinkIssuer<S>,
    config: SealboxConfig,
}

impl<S: Store + ?Sized> FileServer<S> {
    /// Create a server over a shared store.
    pub fn new(store: Arc<S>, config: SealboxConfig) -> Self {
        let registry = PermissionRegistry::new(store.clone());
        let issuer = ShareLinkIssuer::new(registry.clone());
        Self {
            store,
            registry,
            issuer,
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &PermissionRegistry<S> {
        &self.registry
    }

    pub fn issuer(&self) -> &ShareLinkIssuer<S> {
        &self.issuer
    }

    pub fn config(&self) -> &SealboxConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────

    /// Accept an encrypted upload.
    ///
    /// # Errors
    /// - `UploadNotAllowed` for guests unless the config allows them.
    /// - `PayloadTooLarge` if the body exceeds `max_upload_size`.
    /// - `InvalidRequest` if the filename is empty.
    /// - `Core(MalformedEnvelope)` if a form field is missing or malformed.
    pub async fn upload(&self, request: UploadRequest, now: i64) -> Result<UploadResponse> {
        let UploadRequest {
            filename,
            principal,
            form,
        } = request;

        if principal.role == Role::Guest && !self.config.guests_may_upload {
            tracing::warn!(user = %principal.user_id, "guest upload refused");
            return Err(SealboxError::UploadNotAllowed(principal.user_id));
        }

        let size = form.body.len() as u64;
        if size > self.config.max_upload_size {
            return Err(SealboxError::PayloadTooLarge {
                size,
                limit: self.config.max_upload_size,
            });
        }

        if filename.trim().is_empty() {
            return Err(SealboxError::InvalidRequest("no file uploaded".into()));
        }

        let unpacked = TransferCodec::upload().unpack(form.body, &form.fields)?;
        let file_type = file_type_for(&filename).to_string();

        let meta = self
            .store
            .insert_file(NewFile {
                owner_id: principal.user_id,
                filename,
                file_type,
                envelope: unpacked.envelope(),
                key_material: unpacked.key_material,
                uploaded_at: now,
            })
            .await?;

        tracing::info!(file_id = %meta.id, owner = %meta.owner_id, size, "upload accepted");

        Ok(UploadResponse {
            message: "Encrypted file uploaded successfully".to_string(),
            filename: meta.filename,
            file_id: meta.id,
            file_type: meta.file_type,
        })
    }

    /// Serve a stored envelope to a principal holding `downloadview`.
    ///
    /// The response body is the ciphertext; nonce, tag and key travel as the
    /// `X-Encryption-IV`, `X-authTag` and `X-Encryption-key` headers, and the
    /// filename as `X-Original-Filename`.
    pub async fn download(&self, file_id: FileId, principal: &Principal) -> Result<TransportForm> {
        self.registry.authorize_download(file_id, principal).await?;
        let form = self.envelope_form(file_id).await?;

        tracing::info!(file_id = %file_id, user = %principal.user_id, "download served");
        Ok(form)
    }

    /// Serve a stored envelope for in-browser preview.
    ///
    /// Same response form as [`download`](Self::download), but any granted
    /// access level is enough, so `view` holders get through.
    pub async fn preview(&self, file_id: FileId, principal: &Principal) -> Result<TransportForm> {
        let access = self.registry.authorize(file_id, principal).await?;
        let form = self.envelope_form(file_id).await?;

        tracing::info!(file_id = %file_id, user = %principal.user_id, access = %access, "preview served");
        Ok(form)
    }

    async fn envelope_form(&self, file_id: FileId) -> Result<TransportForm> {
        let stored = self
            .store
            .get_file(file_id)
            .await?
            .ok_or(SealboxError::FileNotFound(file_id))?;

        let mut form = TransferCodec::download().pack(&stored.envelope, &stored.key_material);
        form.fields
            .insert(ORIGINAL_FILENAME_HEADER, stored.metadata.filename);
        Ok(form)
    }

    /// Files visible to a principal, newest first.
    ///
    /// Admins see every file; everyone else sees what they own or were granted.
    pub async fn list_files(&self, principal: &Principal) -> Result<FileListing> {
        let files = if principal.is_admin() {
            self.store.list_all_files().await?
        } else {
            self.store.list_files_for(principal.user_id).await?
        };

        Ok(FileListing {
            files: files.into_iter().map(Into::into).collect(),
        })
    }

    /// Delete a file with its permissions and share links. Owner or admin only.
    pub async fn delete_file(&self, file_id: FileId, principal: &Principal) -> Result<DeleteResponse> {
        let file = self.registry.file(file_id).await?;
        if !principal.is_owner_or_admin(&file) {
            return Err(PermsError::Denied {
                user_id: principal.user_id,
                file_id,
                reason: "only the owner or an admin may delete a file",
            }
            .into());
        }

        if !self.store.delete_file(file_id).await? {
            return Err(SealboxError::FileNotFound(file_id));
        }

        tracing::info!(file_id = %file_id, by = %principal.user_id, "file deleted");
        Ok(DeleteResponse {
            message: "File deleted successfully".to_string(),
            filename: file.filename,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permissions
    // ─────────────────────────────────────────────────────────────────────────

    /// The permission entries of a file. Owner or admin only.
    pub async fn permissions(
        &self,
        file_id: FileId,
        principal: &Principal,
    ) -> Result<PermissionsResponse> {
        let file = self.registry.file(file_id).await?;
        if !principal.is_owner_or_admin(&file) {
            return Err(PermsError::Denied {
                user_id: principal.user_id,
                file_id,
                reason: "only the owner or an admin may read permissions",
            }
            .into());
        }

        Ok(self.registry.list(file_id).await?.into_iter().collect())
    }

    /// Replace a file's permission set.
    pub async fn update_permissions(
        &self,
        update: &PermissionsUpdate,
        principal: &Principal,
    ) -> Result<PermissionsResponse> {
        self.registry
            .replace(update.file_id, principal, &update.entries())
            .await?;
        Ok(self.registry.list(update.file_id).await?.into_iter().collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Share Links
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a share link and return its public URL.
    pub async fn create_share_link(
        &self,
        request: ShareLinkRequest,
        principal: &Principal,
        now: i64,
    ) -> Result<ShareLinkResponse> {
        let link = self
            .issuer
            .issue(request.file_id, principal, request.expiration, now)
            .await?;

        Ok(ShareLinkResponse {
            success: true,
            share_link: share_url(&self.config.share_base_url, &link.token),
            expires_at: link.expires_at,
        })
    }

    /// Resolve a share token and return the decrypted file.
    ///
    /// No principal is involved: the token is the capability.
    pub async fn access_shared(&self, token: &ShareToken, now: i64) -> Result<ShareAccessResponse> {
        let link = self.issuer.validate(token, now).await?;

        let stored = self
            .store
            .get_file(link.file_id)
            .await?
            .ok_or(SealboxError::FileNotFound(link.file_id))?;

        let plaintext = stored.envelope.open(&stored.key_material.to_key())?;

        tracing::info!(file_id = %link.file_id, "shared file accessed");
        Ok(ShareAccessResponse {
            filename: stored.metadata.filename,
            file_type: stored.metadata.file_type,
            file_size: format_bytes(stored.metadata.size),
            file_content: BASE64.encode(plaintext),
        })
    }
}
