//! Request and response shapes exchanged with the file server.
//!
//! JSON field names match what the web client sends and expects
//! (`userId`/`accessType` in permission payloads, snake_case elsewhere).

use serde::{Deserialize, Serialize};

use sealbox_core::{
    AccessType, FileId, FileMetadata, PermissionEntry, Principal, TransportForm, UserId,
};

/// Response header carrying the original filename on download.
pub const ORIGINAL_FILENAME_HEADER: &str = "X-Original-Filename";

/// An encrypted upload as it reaches the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub filename: String,
    pub principal: Principal,
    /// Ciphertext body plus `iv`, `key` and `authTag` form fields.
    pub form: TransportForm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub file_id: FileId,
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub filename: String,
}

/// One row of a file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub id: FileId,
    pub filename: String,
    /// Unix ms.
    pub uploaded_at: i64,
    pub size: u64,
    pub file_type: String,
    pub user_id: UserId,
}

impl From<FileMetadata> for FileSummary {
    fn from(meta: FileMetadata) -> Self {
        Self {
            id: meta.id,
            filename: meta.filename,
            uploaded_at: meta.uploaded_at,
            size: meta.size,
            file_type: meta.file_type,
            user_id: meta.owner_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileListing {
    pub files: Vec<FileSummary>,
}

/// A user's access as it appears in permission payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    pub user_id: UserId,
    pub access_type: AccessType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsResponse {
    pub permissions: Vec<PermissionGrant>,
}

impl FromIterator<PermissionEntry> for PermissionsResponse {
    fn from_iter<I: IntoIterator<Item = PermissionEntry>>(iter: I) -> Self {
        Self {
            permissions: iter
                .into_iter()
                .map(|e| PermissionGrant {
                    user_id: e.user_id,
                    access_type: e.access_type,
                })
                .collect(),
        }
    }
}

/// Full replacement of a file's permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsUpdate {
    pub file_id: FileId,
    pub permissions: Vec<PermissionGrant>,
}

impl PermissionsUpdate {
    pub fn entries(&self) -> Vec<PermissionEntry> {
        self.permissions
            .iter()
            .map(|g| PermissionEntry::new(self.file_id, g.user_id, g.access_type))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLinkRequest {
    pub file_id: FileId,
    /// Lifetime in seconds: 30, 60 or 120.
    pub expiration: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLinkResponse {
    pub success: bool,
    pub share_link: String,
    /// Unix ms.
    pub expires_at: i64,
}

/// A shared file, decrypted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareAccessResponse {
    pub filename: String,
    pub file_type: String,
    /// Human readable, e.g. `1.5 KB`.
    pub file_size: String,
    /// Base64 of the plaintext.
    pub file_content: String,
}

/// Human-readable size with binary units, rounded to two decimals.
///
/// `0` is `"0 Bytes"`; otherwise at least one decimal is kept, so `1024`
/// renders as `"1.0 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", (value * 100.0).round() / 100.0);
    let trimmed = rounded.trim_end_matches('0');
    let number = if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    };
    format!("{} {}", number, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(10), "10.0 Bytes");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_000_000), "976.56 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(3 * 1024u64.pow(4)), "3.0 TB");
        assert_eq!(format_bytes(2048 * 1024u64.pow(4)), "2048.0 TB");
    }

    #[test]
    fn test_permissions_update_wire_shape() {
        let json = r#"{"fileId": 7, "permissions": [{"userId": 3, "accessType": "downloadview"}]}"#;
        let update: PermissionsUpdate = serde_json::from_str(json).unwrap();

        assert_eq!(
            update.entries(),
            vec![PermissionEntry::new(FileId(7), UserId(3), AccessType::DownloadView)]
        );
    }

    #[test]
    fn test_unknown_access_type_rejected() {
        let json = r#"{"fileId": 7, "permissions": [{"userId": 3, "accessType": "edit"}]}"#;
        assert!(serde_json::from_str::<PermissionsUpdate>(json).is_err());
    }

    #[test]
    fn test_permissions_response_wire_shape() {
        let response: PermissionsResponse =
            vec![PermissionEntry::new(FileId(1), UserId(2), AccessType::View)]
                .into_iter()
                .collect();

        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"permissions":[{"userId":2,"accessType":"view"}]}"#
        );
    }

    #[test]
    fn test_upload_response_wire_shape() {
        let response = UploadResponse {
            message: "Encrypted file uploaded successfully".into(),
            filename: "a.pdf".into(),
            file_id: FileId(4),
            file_type: "application/pdf".into(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["file_id"], 4);
        assert_eq!(value["file_type"], "application/pdf");
    }
}
