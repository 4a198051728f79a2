//! # Sealbox Core
//!
//! Pure primitives for Sealbox: per-file symmetric keys, AES-256-GCM envelopes,
//! and the codec that carries an envelope across a text-oriented transport.
//!
//! This crate performs no I/O.
//!
//! ## Key Types
//!
//! - [`SymmetricKey`] - A 256-bit AES-GCM key, zeroized on drop
//! - [`KeyMaterial`] - The raw 32-byte export of a key, carried with the ciphertext
//! - [`Envelope`] - Ciphertext, nonce and authentication tag of one file
//! - [`TransferCodec`] - Packs an envelope into a body plus side-channel fields
//!
//! ## Upload and download
//!
//! ```rust
//! use sealbox_core::{cipher, SymmetricKey, TransferCodec};
//!
//! # fn main() -> sealbox_core::Result<()> {
//! // Upload: generate -> encrypt -> pack
//! let key = SymmetricKey::generate()?;
//! let envelope = cipher::encrypt(b"quarterly report", &key)?;
//! let form = TransferCodec::upload().pack(&envelope, &key.export());
//!
//! // Download: unpack -> import -> decrypt
//! let unpacked = TransferCodec::upload().unpack(form.body.clone(), &form.fields)?;
//! let key = unpacked.key_material.to_key();
//! let plaintext = unpacked.envelope().open(&key)?;
//! assert_eq!(plaintext, b"quarterly report");
//! # Ok(())
//! # }
//! ```

pub mod cipher;
pub mod codec;
pub mod error;
pub mod keys;
pub mod types;

pub use cipher::{AuthTag, Envelope, Nonce, NONCE_SIZE, TAG_SIZE};
pub use codec::{FieldNames, SideChannel, TransferCodec, TransportForm, Unpacked};
pub use error::{CoreError, Result};
pub use keys::{KeyMaterial, SymmetricKey, KEY_SIZE};
pub use types::{
    file_type_for, AccessType, FileId, FileMetadata, PermissionEntry, Principal, Role, ShareLink,
    ShareToken, ShareTtl, UnsupportedTtl, UserId,
};
