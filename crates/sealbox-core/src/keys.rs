//! Per-file symmetric keys.
//!
//! Every upload generates a fresh [`SymmetricKey`]; every download imports one
//! from the transmitted [`KeyMaterial`]. Keys are never cached or shared between
//! operations, and their bytes are zeroized when the owning scope drops them.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CoreError, Result};

/// Length of an AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// A 256-bit AES-GCM key.
///
/// Opaque: the only way to get at the bytes is [`SymmetricKey::export`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Generate a fresh key from the operating system CSPRNG.
    ///
    /// # Errors
    /// - `KeyGeneration` if the randomness source is unavailable.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CoreError::KeyGeneration(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Import a key from raw bytes.
    ///
    /// The provenance of the bytes is not checked; any 32 bytes make a key.
    ///
    /// # Errors
    /// - `InvalidKeyLength` unless `bytes` is exactly 32 bytes long.
    pub fn import(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| CoreError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Export the raw key bytes for transport.
    pub fn export(&self) -> KeyMaterial {
        KeyMaterial(self.0)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}

/// The raw export of a [`SymmetricKey`].
///
/// This travels next to the ciphertext as an ordinary byte sequence; the storage
/// tier receives it along with the file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial(pub [u8; KEY_SIZE]);

impl KeyMaterial {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Turn the material back into a usable key.
    ///
    /// Infallible: the length is already fixed by the type.
    pub fn to_key(&self) -> SymmetricKey {
        SymmetricKey(self.0)
    }
}

impl TryFrom<&[u8]> for KeyMaterial {
    type Error = CoreError;

    fn try_from(slice: &[u8]) -> Result<Self> {
        SymmetricKey::import(slice).map(|key| key.export())
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial([REDACTED; {} bytes])", KEY_SIZE)
    }
}
