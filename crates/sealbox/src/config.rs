//! Configuration for the Sealbox file server.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default public prefix for share-link URLs.
pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:8000/api";

/// Default upload limit: 100 MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Configuration for the [`FileServer`](crate::FileServer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SealboxConfig {
    /// Prefix of share URLs; links look like `{share_base_url}/access/{token}`.
    pub share_base_url: String,
    /// Largest accepted ciphertext body in bytes.
    pub max_upload_size: u64,
    /// Whether principals with the guest role may upload.
    pub guests_may_upload: bool,
}

impl Default for SealboxConfig {
    fn default() -> Self {
        Self {
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            guests_may_upload: false,
        }
    }
}

impl SealboxConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
