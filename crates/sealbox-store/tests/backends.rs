//! The SQLite and in-memory stores must be observably identical.

use sealbox_core::{
    cipher, AccessType, FileId, PermissionEntry, ShareLink, ShareToken, ShareTtl, SymmetricKey,
    UserId,
};
use sealbox_store::{MemoryStore, NewFile, SqliteStore, Store};

fn upload(owner: i64, name: &str, at: i64) -> NewFile {
    let key = SymmetricKey::generate().unwrap();
    NewFile {
        owner_id: UserId(owner),
        filename: name.to_string(),
        file_type: sealbox_core::file_type_for(name).to_string(),
        envelope: cipher::encrypt(name.as_bytes(), &key).unwrap(),
        key_material: key.export(),
        uploaded_at: at,
    }
}

/// Run one scenario and return a transcript of everything observable.
async fn scenario(store: &dyn Store) -> Vec<String> {
    let mut log = Vec::new();

    let a = store.insert_file(upload(1, "a.pdf", 100)).await.unwrap();
    let b = store.insert_file(upload(2, "b.png", 200)).await.unwrap();
    let c = store.insert_file(upload(2, "c.zip", 300)).await.unwrap();
    log.push(format!("{:?}", (a.id, b.id, c.id)));

    store
        .replace_permissions(
            b.id,
            &[
                PermissionEntry::new(b.id, UserId(1), AccessType::DownloadView),
                PermissionEntry::new(b.id, UserId(3), AccessType::View),
            ],
        )
        .await
        .unwrap();
    log.push(format!("{:?}", store.get_permissions(b.id).await.unwrap()));

    for user in [1, 2, 3, 4] {
        let ids: Vec<FileId> = store
            .list_files_for(UserId(user))
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        log.push(format!("user {} sees {:?}", user, ids));
    }

    let link = ShareLink::new(ShareToken::new("c".repeat(32)), c.id, 1_000, ShareTtl::Secs120);
    store.insert_share_link(&link).await.unwrap();
    log.push(format!("{:?}", store.get_share_link(&link.token).await.unwrap()));

    store
        .replace_permissions(b.id, &[PermissionEntry::new(b.id, UserId(3), AccessType::DownloadView)])
        .await
        .unwrap();
    log.push(format!("{:?}", store.get_permission(b.id, UserId(1)).await.unwrap()));
    log.push(format!("{:?}", store.get_permission(b.id, UserId(3)).await.unwrap()));

    log.push(format!("{}", store.delete_file(c.id).await.unwrap()));
    log.push(format!("{:?}", store.get_share_link(&link.token).await.unwrap()));
    log.push(format!("{:?}", store.list_share_links(c.id).await.unwrap()));
    log.push(format!("{}", store.delete_file(c.id).await.unwrap()));

    let all: Vec<String> = store
        .list_all_files()
        .await
        .unwrap()
        .into_iter()
        .map(|f| format!("{}:{}:{}:{}", f.id, f.filename, f.file_type, f.size))
        .collect();
    log.push(all.join(","));

    log
}

#[tokio::test]
async fn sqlite_and_memory_agree() {
    let sqlite = SqliteStore::open_memory().unwrap();
    let memory = MemoryStore::new();

    let from_sqlite = scenario(&sqlite).await;
    let from_memory = scenario(&memory).await;

    assert_eq!(from_sqlite, from_memory);
    assert_eq!(from_sqlite[2], "user 1 sees [FileId(2), FileId(1)]");
    assert_eq!(from_sqlite[5], "user 4 sees []");
}
