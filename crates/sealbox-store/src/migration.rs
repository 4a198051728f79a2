//! Database schema migrations for SQLite.
//!
//! Each migration is a SQL batch that moves the schema from version N to N+1.
//! All pending migrations run inside one transaction.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent: calling it on an up-to-date database does nothing.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: files, permissions, share links.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Uploaded envelopes with their metadata
        CREATE TABLE files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            filename TEXT NOT NULL,
            file_type TEXT NOT NULL,
            size INTEGER NOT NULL,            -- ciphertext length in bytes
            ciphertext BLOB NOT NULL,
            nonce BLOB NOT NULL,              -- 12 bytes
            tag BLOB NOT NULL,                -- 16 bytes
            key_material BLOB NOT NULL,       -- 32 bytes, as sent by the client
            uploaded_at INTEGER NOT NULL      -- Unix ms
        );

        -- Per-user access entries
        CREATE TABLE permissions (
            file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL,
            access_type TEXT NOT NULL CHECK (access_type IN ('view', 'downloadview')),
            PRIMARY KEY (file_id, user_id)
        );

        -- Time-boxed share links
        CREATE TABLE share_links (
            token TEXT PRIMARY KEY,
            file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL,
            ttl_secs INTEGER NOT NULL
        );

        CREATE INDEX idx_files_owner ON files(owner_id);
        CREATE INDEX idx_files_uploaded ON files(uploaded_at);
        CREATE INDEX idx_permissions_user ON permissions(user_id);
        CREATE INDEX idx_share_links_file ON share_links(file_id);
        "#,
    )?;

    Ok(())
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in ["files", "permissions", "share_links", "schema_migrations"] {
            assert!(tables.contains(&table.to_string()), "missing {}", table);
        }
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_access_type_constraint() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO files (owner_id, filename, file_type, size, ciphertext, nonce, tag, key_material, uploaded_at)
             VALUES (1, 'a', 'text/plain', 0, x'', x'', x'', x'', 0)",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO permissions (file_id, user_id, access_type) VALUES (1, 2, 'edit')",
            [],
        );
        assert!(result.is_err());
    }
}
