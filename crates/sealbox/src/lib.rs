//! # Sealbox
//!
//! Client-side encrypted file sharing with per-file permissions and
//! time-limited share links.
//!
//! ## Overview
//!
//! - **Client**: [`FileClient`] encrypts every upload under a fresh AES-256-GCM
//!   key and decrypts every download, over any [`Transport`]
//! - **Server**: [`FileServer`] stores envelopes with their key material and
//!   gates downloads and previews through the permission registry
//! - **Share links**: 30, 60 or 120 second bearer links that the server
//!   resolves by decrypting the file itself
//!
//! The key material travels with the ciphertext and the server stores both.
//! Confidentiality against the server is not a property of this system.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sealbox::{FileClient, FileServer, LocalTransport, SealboxConfig};
//! use sealbox::core::Principal;
//! use sealbox::store::SqliteStore;
//!
//! async fn example() -> sealbox::Result<()> {
//!     let store = Arc::new(SqliteStore::open("sealbox.db")?);
//!     let server = Arc::new(FileServer::new(store, SealboxConfig::default()));
//!
//!     let alice = FileClient::new(LocalTransport::new(server.clone()), Principal::user(1));
//!     let uploaded = alice.upload("notes.txt", b"meeting notes").await?;
//!
//!     let file = alice.download(uploaded.file_id).await?;
//!     assert_eq!(file.content, b"meeting notes");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `sealbox::core` - Keys, envelopes, transfer codec, domain types
//! - `sealbox::store` - Storage abstraction and SQLite
//! - `sealbox::perms` - Permission registry and share links

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use sealbox_core as core;
pub use sealbox_perms as perms;
pub use sealbox_store as store;

pub use client::{DownloadedFile, FileClient};
pub use config::SealboxConfig;
pub use error::{Result, SealboxError};
pub use server::FileServer;
pub use transport::{now_millis, LocalTransport, Transport};

pub use sealbox_core::{AccessType, FileId, Principal, Role, ShareToken, UserId};
