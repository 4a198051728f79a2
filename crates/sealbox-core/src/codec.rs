//! Transfer codec: an envelope and its key across the upload/download boundary.
//!
//! The ciphertext travels as the opaque request or response body. Nonce, tag and
//! key material travel as side-channel fields (form fields on upload, headers on
//! download), each written as a JSON array of byte values such as `[12,0,255]`
//! so that they survive text-only channels.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::cipher::{AuthTag, Envelope, Nonce, NONCE_SIZE, TAG_SIZE};
use crate::error::{CoreError, Result};
use crate::keys::{KeyMaterial, KEY_SIZE};

/// Names of the three side-channel fields for one direction of transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldNames {
    pub nonce: &'static str,
    pub key: &'static str,
    pub tag: &'static str,
    /// HTTP header names compare case-insensitively; form fields do not.
    pub case_insensitive: bool,
}

impl FieldNames {
    /// Multipart form fields sent by the client on upload.
    pub const UPLOAD: Self = Self {
        nonce: "iv",
        key: "key",
        tag: "authTag",
        case_insensitive: false,
    };

    /// Response headers sent by the server on download.
    pub const DOWNLOAD: Self = Self {
        nonce: "X-Encryption-IV",
        key: "X-Encryption-key",
        tag: "X-authTag",
        case_insensitive: true,
    };
}

/// Side-channel fields accompanying a body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SideChannel(BTreeMap<String, String>);

impl SideChannel {
    /// Create an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// ASCII case-insensitive lookup, as for HTTP headers.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Remove a field.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SideChannel {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// What actually crosses the wire: a body plus side-channel fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportForm {
    pub body: Bytes,
    pub fields: SideChannel,
}

/// The four values recovered by [`TransferCodec::unpack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpacked {
    pub ciphertext: Bytes,
    pub nonce: Nonce,
    pub tag: AuthTag,
    pub key_material: KeyMaterial,
}

impl Unpacked {
    /// Reassemble the envelope (key material is left out).
    pub fn envelope(&self) -> Envelope {
        Envelope {
            ciphertext: self.ciphertext.clone(),
            nonce: self.nonce,
            tag: self.tag,
        }
    }
}

/// Packs and unpacks envelopes for one direction of transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCodec {
    names: FieldNames,
}

impl TransferCodec {
    /// Codec with custom field names.
    pub const fn new(names: FieldNames) -> Self {
        Self { names }
    }

    /// Codec for the client-to-server upload form.
    pub const fn upload() -> Self {
        Self::new(FieldNames::UPLOAD)
    }

    /// Codec for the server-to-client download response.
    pub const fn download() -> Self {
        Self::new(FieldNames::DOWNLOAD)
    }

    /// The field names this codec reads and writes.
    pub fn names(&self) -> FieldNames {
        self.names
    }

    /// Place the ciphertext in the body and nonce, tag and key in side fields.
    pub fn pack(&self, envelope: &Envelope, key_material: &KeyMaterial) -> TransportForm {
        let mut fields = SideChannel::new();
        fields.insert(self.names.nonce, encode_byte_array(envelope.nonce.as_bytes()));
        fields.insert(self.names.key, encode_byte_array(key_material.as_bytes()));
        fields.insert(self.names.tag, encode_byte_array(envelope.tag.as_bytes()));

        TransportForm {
            body: envelope.ciphertext.clone(),
            fields,
        }
    }

    /// Recover ciphertext, nonce, tag and key material.
    ///
    /// # Errors
    /// - `MalformedEnvelope` if a field is absent, is not a JSON array of byte
    ///   values, or does not have the required length.
    pub fn unpack(&self, body: Bytes, fields: &SideChannel) -> Result<Unpacked> {
        let nonce: [u8; NONCE_SIZE] = self.field(fields, self.names.nonce)?;
        let tag: [u8; TAG_SIZE] = self.field(fields, self.names.tag)?;
        let key: [u8; KEY_SIZE] = self.field(fields, self.names.key)?;

        Ok(Unpacked {
            ciphertext: body,
            nonce: Nonce(nonce),
            tag: AuthTag(tag),
            key_material: KeyMaterial(key),
        })
    }

    fn field<const N: usize>(&self, fields: &SideChannel, name: &str) -> Result<[u8; N]> {
        let raw = if self.names.case_insensitive {
            fields.get_ignore_case(name)
        } else {
            fields.get(name)
        }
        .ok_or_else(|| CoreError::MalformedEnvelope(format!("missing field {}", name)))?;

        let bytes = decode_byte_array(raw)
            .map_err(|e| CoreError::MalformedEnvelope(format!("field {}: {}", name, e)))?;

        let len = bytes.len();
        bytes.try_into().map_err(|_| {
            CoreError::MalformedEnvelope(format!(
                "field {}: expected {} bytes, got {}",
                name, N, len
            ))
        })
    }
}

/// Write bytes as a compact JSON array of integers.
pub fn encode_byte_array(bytes: &[u8]) -> String {
    serde_json::Value::from(bytes).to_string()
}

/// Parse a JSON array of integers in `0..=255`.
pub fn decode_byte_array(raw: &str) -> std::result::Result<Vec<u8>, serde_json::Error> {
    serde_json::from_str(raw.trim())
}
