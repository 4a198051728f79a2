//! Strong type definitions for files, principals, permissions and share links.
//!
//! Identifiers are newtypes to prevent mixing up a file id with a user id.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub i64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Guest,
}

/// The acting identity for one request.
///
/// Passed explicitly to every gated operation; nothing reads identity from
/// ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    /// A regular user.
    pub const fn user(id: i64) -> Self {
        Self {
            user_id: UserId(id),
            role: Role::User,
        }
    }

    /// An administrator.
    pub const fn admin(id: i64) -> Self {
        Self {
            user_id: UserId(id),
            role: Role::Admin,
        }
    }

    /// A guest.
    pub const fn guest(id: i64) -> Self {
        Self {
            user_id: UserId(id),
            role: Role::Guest,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner of the file or an administrator.
    pub fn is_owner_or_admin(&self, file: &FileMetadata) -> bool {
        self.is_admin() || file.owner_id == self.user_id
    }
}

/// Access level granted to a user for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessType {
    /// Preview only.
    #[serde(rename = "view")]
    View,
    /// Preview and download.
    #[serde(rename = "downloadview")]
    DownloadView,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::View => "view",
            AccessType::DownloadView => "downloadview",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(AccessType::View),
            "downloadview" => Some(AccessType::DownloadView),
            _ => None,
        }
    }

    /// Whether this level allows fetching the file for download.
    pub fn permits_download(&self) -> bool {
        matches!(self, AccessType::DownloadView)
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ACL entry. Unique per `(file_id, user_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub file_id: FileId,
    pub user_id: UserId,
    pub access_type: AccessType,
}

impl PermissionEntry {
    pub const fn new(file_id: FileId, user_id: UserId, access_type: AccessType) -> Self {
        Self {
            file_id,
            user_id,
            access_type,
        }
    }
}

/// A requested share-link lifetime outside `{30, 60, 120}` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported share link ttl: {0}s (allowed: 30, 60, 120)")]
pub struct UnsupportedTtl(pub u64);

/// Share-link lifetime. Only three values are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum ShareTtl {
    Secs30,
    Secs60,
    Secs120,
}

impl ShareTtl {
    pub const ALL: [ShareTtl; 3] = [ShareTtl::Secs30, ShareTtl::Secs60, ShareTtl::Secs120];

    pub const fn as_secs(&self) -> u64 {
        match self {
            ShareTtl::Secs30 => 30,
            ShareTtl::Secs60 => 60,
            ShareTtl::Secs120 => 120,
        }
    }

    pub const fn as_millis(&self) -> i64 {
        self.as_secs() as i64 * 1000
    }
}

impl Default for ShareTtl {
    fn default() -> Self {
        ShareTtl::Secs60
    }
}

impl TryFrom<u64> for ShareTtl {
    type Error = UnsupportedTtl;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        match secs {
            30 => Ok(ShareTtl::Secs30),
            60 => Ok(ShareTtl::Secs60),
            120 => Ok(ShareTtl::Secs120),
            other => Err(UnsupportedTtl(other)),
        }
    }
}

impl From<ShareTtl> for u64 {
    fn from(ttl: ShareTtl) -> Self {
        ttl.as_secs()
    }
}

/// Bearer token naming a share link: 32 lowercase hex characters.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(pub String);

impl ShareToken {
    /// Length of a token in characters.
    pub const LEN: usize = 32;

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token has the shape of one this system issues.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == Self::LEN
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }
}

impl fmt::Debug for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bearer capability: show a prefix only.
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "ShareToken({}..)", prefix)
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A time-boxed capability for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    pub token: ShareToken,
    pub file_id: FileId,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds; always `created_at + ttl`.
    pub expires_at: i64,
    pub ttl: ShareTtl,
}

impl ShareLink {
    pub fn new(token: ShareToken, file_id: FileId, created_at: i64, ttl: ShareTtl) -> Self {
        Self {
            token,
            file_id,
            created_at,
            expires_at: created_at.saturating_add(ttl.as_millis()),
            ttl,
        }
    }

    /// A link is expired strictly after `expires_at`.
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }
}

/// Metadata of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: FileId,
    pub owner_id: UserId,
    pub filename: String,
    pub file_type: String,
    /// Size of the stored ciphertext in bytes (equal to the plaintext size).
    pub size: u64,
    /// Unix milliseconds.
    pub uploaded_at: i64,
}

/// MIME type guessed from a filename extension.
pub fn file_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "txt" => "text/plain",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_type_wire_names() {
        assert_eq!(serde_json::to_string(&AccessType::View).unwrap(), "\"view\"");
        assert_eq!(
            serde_json::to_string(&AccessType::DownloadView).unwrap(),
            "\"downloadview\""
        );
        assert_eq!(AccessType::parse("downloadview"), Some(AccessType::DownloadView));
        assert_eq!(AccessType::parse("edit"), None);
    }

    #[test]
    fn test_only_downloadview_permits_download() {
        assert!(AccessType::DownloadView.permits_download());
        assert!(!AccessType::View.permits_download());
    }

    #[test]
    fn test_share_ttl_enumerated_values() {
        for secs in [30u64, 60, 120] {
            assert_eq!(ShareTtl::try_from(secs).unwrap().as_secs(), secs);
        }
        for secs in [0u64, 29, 31, 90, 3600] {
            assert_eq!(ShareTtl::try_from(secs), Err(UnsupportedTtl(secs)));
        }
    }

    #[test]
    fn test_share_ttl_serde_rejects_other_values() {
        assert_eq!(serde_json::from_str::<ShareTtl>("120").unwrap(), ShareTtl::Secs120);
        assert!(serde_json::from_str::<ShareTtl>("45").is_err());
    }

    #[test]
    fn test_share_link_expiry_boundary() {
        let link = ShareLink::new(ShareToken::new("ab".repeat(16)), FileId(1), 1_000, ShareTtl::Secs30);

        assert_eq!(link.expires_at, 31_000);
        assert!(!link.is_expired(31_000));
        assert!(link.is_expired(31_001));
    }

    #[test]
    fn test_share_link_expiry_saturates_near_max_time() {
        let link = ShareLink::new(ShareToken::new("ab".repeat(16)), FileId(1), i64::MAX - 5, ShareTtl::Secs120);

        assert_eq!(link.expires_at, i64::MAX);
        assert!(!link.is_expired(i64::MAX));
    }

    #[test]
    fn test_share_token_shape() {
        assert!(ShareToken::new("0123456789abcdef0123456789abcdef").is_well_formed());
        assert!(!ShareToken::new("0123456789ABCDEF0123456789ABCDEF").is_well_formed());
        assert!(!ShareToken::new("short").is_well_formed());
    }

    #[test]
    fn test_share_token_debug_shows_prefix_only() {
        let token = ShareToken::new("0123456789abcdef0123456789abcdef");
        assert_eq!(format!("{:?}", token), "ShareToken(01234567..)");
    }

    #[test]
    fn test_file_type_for_extensions() {
        assert_eq!(file_type_for("report.PDF"), "application/pdf");
        assert_eq!(file_type_for("photo.jpeg"), "image/jpeg");
        assert_eq!(file_type_for("notes.txt"), "text/plain");
        assert_eq!(file_type_for("archive.tar.gz"), "application/octet-stream");
        assert_eq!(file_type_for("README"), "application/octet-stream");
    }

    #[test]
    fn test_owner_or_admin() {
        let file = FileMetadata {
            id: FileId(1),
            owner_id: UserId(7),
            filename: "a.txt".into(),
            file_type: "text/plain".into(),
            size: 3,
            uploaded_at: 0,
        };

        assert!(Principal::user(7).is_owner_or_admin(&file));
        assert!(Principal::admin(99).is_owner_or_admin(&file));
        assert!(!Principal::user(8).is_owner_or_admin(&file));
        assert!(!Principal::guest(8).is_owner_or_admin(&file));
    }
}
