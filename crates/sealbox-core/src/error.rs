//! Error types for Sealbox Core.

use thiserror::Error;

/// Errors from key handling, envelope cryptography, and the transfer codec.
///
/// `AuthenticationFailure` means the tag did not verify. A wrongly shaped input
/// is `MalformedInput` or `MalformedEnvelope` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The secure randomness source could not produce key or nonce bytes.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Raw key bytes were not exactly 32 bytes long.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Nonce or tag passed to decryption had the wrong size.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The AEAD tag did not verify.
    #[error("authentication failed: ciphertext, tag, nonce or key do not match")]
    AuthenticationFailure,

    /// A side-channel field was missing, unparsable, or had the wrong length.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
