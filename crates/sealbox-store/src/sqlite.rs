//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for Sealbox. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use sealbox_core::{
    AccessType, AuthTag, Envelope, FileId, FileMetadata, KeyMaterial, Nonce, PermissionEntry,
    ShareLink, ShareToken, ShareTtl, UserId,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{NewFile, Store, StoredFile};

const METADATA_COLUMNS: &str = "id, owner_id, filename, file_type, size, uploaded_at";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking closure against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(StoreError::poisoned)?;
            f(&mut conn)
        })
        .await
        .map_err(StoreError::join_failed)?
    }
}

fn blob_array<const N: usize>(row: &Row<'_>, column: &str) -> rusqlite::Result<[u8; N]> {
    let bytes: Vec<u8> = row.get(column)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Blob,
            format!("{} must be {} bytes, got {}", column, N, len).into(),
        )
    })
}

fn row_to_metadata(row: &Row<'_>) -> rusqlite::Result<FileMetadata> {
    Ok(FileMetadata {
        id: FileId(row.get("id")?),
        owner_id: UserId(row.get("owner_id")?),
        filename: row.get("filename")?,
        file_type: row.get("file_type")?,
        size: row.get::<_, i64>("size")? as u64,
        uploaded_at: row.get("uploaded_at")?,
    })
}

fn row_to_stored_file(row: &Row<'_>) -> rusqlite::Result<StoredFile> {
    let metadata = row_to_metadata(row)?;
    let ciphertext: Vec<u8> = row.get("ciphertext")?;

    Ok(StoredFile {
        metadata,
        envelope: Envelope {
            ciphertext: Bytes::from(ciphertext),
            nonce: Nonce(blob_array(row, "nonce")?),
            tag: AuthTag(blob_array(row, "tag")?),
        },
        key_material: KeyMaterial(blob_array(row, "key_material")?),
    })
}

fn row_to_permission(row: &Row<'_>) -> rusqlite::Result<PermissionEntry> {
    let raw: String = row.get("access_type")?;
    let access_type = AccessType::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown access type: {}", raw).into(),
        )
    })?;

    Ok(PermissionEntry {
        file_id: FileId(row.get("file_id")?),
        user_id: UserId(row.get("user_id")?),
        access_type,
    })
}

fn row_to_share_link(row: &Row<'_>) -> rusqlite::Result<ShareLink> {
    let ttl_secs: i64 = row.get("ttl_secs")?;
    let ttl = ShareTtl::try_from(ttl_secs as u64)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(e)))?;

    Ok(ShareLink {
        token: ShareToken(row.get("token")?),
        file_id: FileId(row.get("file_id")?),
        created_at: row.get("created_at")?,
        expires_at: row.get("expires_at")?,
        ttl,
    })
}

fn query_metadata(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<FileMetadata>> {
    let mut stmt = conn.prepare(sql)?;
    let files = stmt
        .query_map(params, row_to_metadata)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(files)
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_file(&self, file: NewFile) -> Result<FileMetadata> {
        self.run(move |conn| {
            let size = file.envelope.ciphertext.len() as i64;

            conn.execute(
                "INSERT INTO files (
                    owner_id, filename, file_type, size, ciphertext, nonce, tag,
                    key_material, uploaded_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    file.owner_id.0,
                    file.filename,
                    file.file_type,
                    size,
                    file.envelope.ciphertext.as_ref(),
                    file.envelope.nonce.as_bytes().as_slice(),
                    file.envelope.tag.as_bytes().as_slice(),
                    file.key_material.as_bytes().as_slice(),
                    file.uploaded_at,
                ],
            )?;

            let id = FileId(conn.last_insert_rowid());
            tracing::debug!(file_id = %id, owner = %file.owner_id, size, "stored file");

            Ok(FileMetadata {
                id,
                owner_id: file.owner_id,
                filename: file.filename.clone(),
                file_type: file.file_type.clone(),
                size: size as u64,
                uploaded_at: file.uploaded_at,
            })
        })
        .await
    }

    async fn get_file(&self, id: FileId) -> Result<Option<StoredFile>> {
        self.run(move |conn| {
            conn.query_row(
                "SELECT id, owner_id, filename, file_type, size, uploaded_at,
                        ciphertext, nonce, tag, key_material
                 FROM files WHERE id = ?1",
                params![id.0],
                row_to_stored_file,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn get_file_metadata(&self, id: FileId) -> Result<Option<FileMetadata>> {
        self.run(move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM files WHERE id = ?1", METADATA_COLUMNS),
                params![id.0],
                row_to_metadata,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_files_for(&self, user: UserId) -> Result<Vec<FileMetadata>> {
        self.run(move |conn| {
            query_metadata(
                conn,
                &format!(
                    "SELECT {} FROM files
                     WHERE owner_id = ?1
                        OR id IN (SELECT file_id FROM permissions WHERE user_id = ?1)
                     ORDER BY uploaded_at DESC, id DESC",
                    METADATA_COLUMNS
                ),
                params![user.0],
            )
        })
        .await
    }

    async fn list_all_files(&self) -> Result<Vec<FileMetadata>> {
        self.run(move |conn| {
            query_metadata(
                conn,
                &format!(
                    "SELECT {} FROM files ORDER BY uploaded_at DESC, id DESC",
                    METADATA_COLUMNS
                ),
                [],
            )
        })
        .await
    }

    async fn delete_file(&self, id: FileId) -> Result<bool> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM permissions WHERE file_id = ?1", params![id.0])?;
            tx.execute("DELETE FROM share_links WHERE file_id = ?1", params![id.0])?;
            let deleted = tx.execute("DELETE FROM files WHERE id = ?1", params![id.0])?;
            tx.commit()?;

            tracing::debug!(file_id = %id, deleted = deleted > 0, "deleted file");
            Ok(deleted > 0)
        })
        .await
    }

    async fn get_permissions(&self, file: FileId) -> Result<Vec<PermissionEntry>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT file_id, user_id, access_type FROM permissions
                 WHERE file_id = ?1 ORDER BY user_id",
            )?;
            let entries = stmt
                .query_map(params![file.0], row_to_permission)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }

    async fn get_permission(&self, file: FileId, user: UserId) -> Result<Option<AccessType>> {
        self.run(move |conn| {
            conn.query_row(
                "SELECT file_id, user_id, access_type FROM permissions
                 WHERE file_id = ?1 AND user_id = ?2",
                params![file.0, user.0],
                row_to_permission,
            )
            .optional()
            .map(|entry| entry.map(|e| e.access_type))
            .map_err(StoreError::from)
        })
        .await
    }

    async fn replace_permissions(&self, file: FileId, entries: &[PermissionEntry]) -> Result<()> {
        let entries = entries.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM permissions WHERE file_id = ?1", params![file.0])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO permissions (file_id, user_id, access_type) VALUES (?1, ?2, ?3)",
                )?;
                for entry in &entries {
                    stmt.execute(params![file.0, entry.user_id.0, entry.access_type.as_str()])?;
                }
            }
            tx.commit()?;

            tracing::debug!(file_id = %file, count = entries.len(), "replaced permissions");
            Ok(())
        })
        .await
    }

    async fn insert_share_link(&self, link: &ShareLink) -> Result<()> {
        let link = link.clone();

        self.run(move |conn| {
            conn.execute(
                "INSERT INTO share_links (token, file_id, created_at, expires_at, ttl_secs)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    link.token.as_str(),
                    link.file_id.0,
                    link.created_at,
                    link.expires_at,
                    link.ttl.as_secs() as i64,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_share_link(&self, token: &ShareToken) -> Result<Option<ShareLink>> {
        let token = token.clone();

        self.run(move |conn| {
            conn.query_row(
                "SELECT token, file_id, created_at, expires_at, ttl_secs
                 FROM share_links WHERE token = ?1",
                params![token.as_str()],
                row_to_share_link,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_share_links(&self, file: FileId) -> Result<Vec<ShareLink>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT token, file_id, created_at, expires_at, ttl_secs
                 FROM share_links WHERE file_id = ?1 ORDER BY created_at, token",
            )?;
            let links = stmt
                .query_map(params![file.0], row_to_share_link)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(links)
        })
        .await
    }
}
