//! AES-256-GCM envelope encryption.
//!
//! An [`Envelope`] keeps the ciphertext, nonce and authentication tag as three
//! separate values so they can travel in different parts of a request: the
//! ciphertext as the body, the nonce and tag as side-channel fields.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key};
use bytes::Bytes;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::keys::SymmetricKey;

/// Nonce size for AES-GCM (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (128 bits).
pub const TAG_SIZE: usize = 16;

/// A 96-bit AES-GCM nonce. Used once per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Draw a fresh random nonce.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CoreError::KeyGeneration(format!("nonce: {}", e)))?;
        Ok(Self(bytes))
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// A 128-bit AES-GCM authentication tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTag(pub [u8; TAG_SIZE]);

impl AuthTag {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; TAG_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; TAG_SIZE] {
        &self.0
    }
}

/// The encrypted form of one file.
///
/// `ciphertext.len()` always equals the plaintext length: GCM is a stream mode
/// and the tag is kept apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Encrypted bytes, without the tag.
    pub ciphertext: Bytes,

    /// Nonce used for this encryption only.
    pub nonce: Nonce,

    /// The last 16 bytes of the AEAD output.
    pub tag: AuthTag,
}

impl Envelope {
    /// Decrypt this envelope with the given key.
    pub fn open(&self, key: &SymmetricKey) -> Result<Vec<u8>> {
        decrypt(&self.ciphertext, &self.nonce.0, &self.tag.0, key)
    }

    /// Get the size of the ciphertext.
    pub fn ciphertext_len(&self) -> usize {
        self.ciphertext.len()
    }
}

fn gcm(key: &SymmetricKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt `plaintext` under `key` with a freshly drawn nonce.
///
/// # Errors
/// - `KeyGeneration` if no nonce could be drawn.
/// - `MalformedInput` if the plaintext exceeds the AES-GCM length limit.
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey) -> Result<Envelope> {
    let nonce = Nonce::generate()?;

    let mut sealed = gcm(key)
        .encrypt(aes_gcm::Nonce::from_slice(&nonce.0), plaintext)
        .map_err(|_| CoreError::MalformedInput("plaintext too large for AES-GCM".to_string()))?;

    // sealed = ciphertext || tag
    let tag_bytes = sealed.split_off(sealed.len() - TAG_SIZE);
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&tag_bytes);

    Ok(Envelope {
        ciphertext: Bytes::from(sealed),
        nonce,
        tag: AuthTag(tag),
    })
}

/// Decrypt a ciphertext whose tag travelled separately.
///
/// The AEAD input is rebuilt as `ciphertext || tag`.
///
/// # Errors
/// - `MalformedInput` if `nonce` is not 12 bytes or `tag` is not 16 bytes.
/// - `AuthenticationFailure` if the tag does not verify.
pub fn decrypt(ciphertext: &[u8], nonce: &[u8], tag: &[u8], key: &SymmetricKey) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_SIZE {
        return Err(CoreError::MalformedInput(format!(
            "nonce must be {} bytes, got {}",
            NONCE_SIZE,
            nonce.len()
        )));
    }
    if tag.len() != TAG_SIZE {
        return Err(CoreError::MalformedInput(format!(
            "tag must be {} bytes, got {}",
            TAG_SIZE,
            tag.len()
        )));
    }

    let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    gcm(key)
        .decrypt(aes_gcm::Nonce::from_slice(nonce), sealed.as_slice())
        .map_err(|_| CoreError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SymmetricKey {
        SymmetricKey::generate().unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = key();
        let envelope = encrypt(b"Hello, World!", &key).unwrap();
        let decrypted = envelope.open(&key).unwrap();

        assert_eq!(decrypted, b"Hello, World!");
    }

    #[test]
    fn test_ten_byte_plaintext_shapes() {
        let key = key();
        let envelope = encrypt(b"0123456789", &key).unwrap();

        assert_eq!(envelope.ciphertext.len(), 10);
        assert_eq!(envelope.nonce.as_bytes().len(), NONCE_SIZE);
        assert_eq!(envelope.tag.as_bytes().len(), TAG_SIZE);

        let other = SymmetricKey::generate().unwrap();
        assert_eq!(envelope.open(&other), Err(CoreError::AuthenticationFailure));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = key();
        let envelope = encrypt(b"", &key).unwrap();

        assert!(envelope.ciphertext.is_empty());
        assert_eq!(envelope.open(&key).unwrap(), b"");
    }

    #[test]
    fn test_different_nonce_each_time() {
        let key = key();
        let e1 = encrypt(b"same plaintext", &key).unwrap();
        let e2 = encrypt(b"same plaintext", &key).unwrap();

        assert_ne!(e1.nonce, e2.nonce);
        assert_ne!(e1.ciphertext, e2.ciphertext);
    }

    #[test]
    fn test_tampered_tag_fails_authentication() {
        let key = key();
        let envelope = encrypt(b"Important data", &key).unwrap();
        let mut tag = envelope.tag.0;
        tag[0] ^= 0x01;

        let result = decrypt(&envelope.ciphertext, &envelope.nonce.0, &tag, &key);
        assert_eq!(result, Err(CoreError::AuthenticationFailure));
    }

    #[test]
    fn test_wrong_nonce_fails_authentication() {
        let key = key();
        let envelope = encrypt(b"Important data", &key).unwrap();
        let nonce = Nonce::generate().unwrap();

        let result = decrypt(&envelope.ciphertext, &nonce.0, &envelope.tag.0, &key);
        assert_eq!(result, Err(CoreError::AuthenticationFailure));
    }

    #[test]
    fn test_bad_nonce_length_is_malformed_input() {
        let key = key();
        let envelope = encrypt(b"data", &key).unwrap();

        let result = decrypt(&envelope.ciphertext, &[0u8; 11], &envelope.tag.0, &key);
        assert!(matches!(result, Err(CoreError::MalformedInput(_))));
    }

    #[test]
    fn test_bad_tag_length_is_malformed_input() {
        let key = key();
        let envelope = encrypt(b"data", &key).unwrap();

        let result = decrypt(&envelope.ciphertext, &envelope.nonce.0, &[0u8; 15], &key);
        assert!(matches!(result, Err(CoreError::MalformedInput(_))));
    }

    #[test]
    fn test_large_plaintext() {
        let key = key();
        let plaintext = vec![0xABu8; 1_000_000];

        let envelope = encrypt(&plaintext, &key).unwrap();
        assert_eq!(envelope.ciphertext_len(), plaintext.len());
        assert_eq!(envelope.open(&key).unwrap(), plaintext);
    }
}
