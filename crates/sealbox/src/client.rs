//! The client pipeline: encrypt before upload, decrypt after download.
//!
//! Upload runs `generate -> encrypt -> pack -> send`; download runs
//! `receive -> unpack -> import -> decrypt`. The steps of one call are strictly
//! sequential and each call owns its key. A failure at any step aborts the call
//! and nothing partial is returned.

use sealbox_core::{cipher, FileId, Principal, SymmetricKey, TransferCodec, TransportForm};

use crate::api::{UploadRequest, UploadResponse, ORIGINAL_FILENAME_HEADER};
use crate::error::Result;
use crate::transport::Transport;

/// A decrypted download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// From `X-Original-Filename`, when the server sent it.
    pub filename: Option<String>,
    pub content: Vec<u8>,
}

/// Client side of Sealbox, acting as one principal over one transport.
pub struct FileClient<T: Transport> {
    transport: T,
    principal: Principal,
}

impl<T: Transport> FileClient<T> {
    pub fn new(transport: T, principal: Principal) -> Self {
        Self {
            transport,
            principal,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Encrypt `plaintext` under a fresh key and upload it.
    pub async fn upload(&self, filename: &str, plaintext: &[u8]) -> Result<UploadResponse> {
        let key = SymmetricKey::generate()?;
        let envelope = cipher::encrypt(plaintext, &key)?;
        let form = TransferCodec::upload().pack(&envelope, &key.export());
        drop(key);

        tracing::debug!(filename, size = plaintext.len(), "sending encrypted upload");
        self.transport
            .upload(UploadRequest {
                filename: filename.to_string(),
                principal: self.principal,
                form,
            })
            .await
    }

    /// Download a file and decrypt it.
    ///
    /// # Errors
    /// - `Network` if the transport fails.
    /// - `Permission` if the server refuses.
    /// - `Core(MalformedEnvelope)` if a header is missing or malformed.
    /// - `Core(AuthenticationFailure)` if the ciphertext, nonce, tag or key was
    ///   altered in transit.
    pub async fn download(&self, file_id: FileId) -> Result<DownloadedFile> {
        let form = self.transport.download(file_id, &self.principal).await?;
        let file = open_form(form)?;

        tracing::debug!(file_id = %file_id, size = file.content.len(), "download decrypted");
        Ok(file)
    }

    /// Fetch a file for preview and decrypt it. Works with `view` access.
    ///
    /// Fails the same ways as [`download`](Self::download).
    pub async fn preview(&self, file_id: FileId) -> Result<DownloadedFile> {
        let form = self.transport.preview(file_id, &self.principal).await?;
        let file = open_form(form)?;

        tracing::debug!(file_id = %file_id, size = file.content.len(), "preview decrypted");
        Ok(file)
    }
}

/// `unpack -> import -> decrypt` over a download-shaped form.
fn open_form(form: TransportForm) -> Result<DownloadedFile> {
    let filename = form
        .fields
        .get_ignore_case(ORIGINAL_FILENAME_HEADER)
        .map(str::to_string);

    let unpacked = TransferCodec::download().unpack(form.body, &form.fields)?;
    let key = SymmetricKey::import(unpacked.key_material.as_bytes())?;
    let content = cipher::decrypt(
        &unpacked.ciphertext,
        unpacked.nonce.as_bytes(),
        unpacked.tag.as_bytes(),
        &key,
    )?;

    Ok(DownloadedFile { filename, content })
}
