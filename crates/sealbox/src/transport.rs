//! Transport abstraction between [`FileClient`](crate::FileClient) and a
//! [`FileServer`](crate::FileServer).
//!
//! Implementations may use HTTP or anything else that can carry a body plus
//! named text fields. Delivery failures surface as `SealboxError::Network`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use sealbox_core::{FileId, Principal, TransportForm};
use sealbox_store::Store;

use crate::api::{UploadRequest, UploadResponse};
use crate::error::{Result, SealboxError};
use crate::server::FileServer;

/// Transport trait for carrying uploads and downloads.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver an upload and return the server's answer.
    async fn upload(&self, request: UploadRequest) -> Result<UploadResponse>;

    /// Fetch a file's ciphertext body and download headers.
    async fn download(&self, file_id: FileId, principal: &Principal) -> Result<TransportForm>;

    /// Fetch a file for preview. Same form as `download`, but `view` access suffices.
    async fn preview(&self, file_id: FileId, principal: &Principal) -> Result<TransportForm>;
}

/// An in-process transport that calls a [`FileServer`] directly.
///
/// Can be switched offline to exercise network failure paths.
pub struct LocalTransport<S: Store + ?Sized> {
    server: Arc<FileServer<S>>,
    online: AtomicBool,
}

impl<S: Store + ?Sized> LocalTransport<S> {
    pub fn new(server: Arc<FileServer<S>>) -> Self {
        Self {
            server,
            online: AtomicBool::new(true),
        }
    }

    /// The server behind this transport.
    pub fn server(&self) -> &Arc<FileServer<S>> {
        &self.server
    }

    /// Simulate the link going down or coming back.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SealboxError::Network("transport offline".into()))
        }
    }
}

#[async_trait]
impl<S: Store + ?Sized + 'static> Transport for LocalTransport<S> {
    async fn upload(&self, request: UploadRequest) -> Result<UploadResponse> {
        self.ensure_online()?;
        self.server.upload(request, now_millis()).await
    }

    async fn download(&self, file_id: FileId, principal: &Principal) -> Result<TransportForm> {
        self.ensure_online()?;
        self.server.download(file_id, principal).await
    }

    async fn preview(&self, file_id: FileId, principal: &Principal) -> Result<TransportForm> {
        self.ensure_online()?;
        self.server.preview(file_id, principal).await
    }
}

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
