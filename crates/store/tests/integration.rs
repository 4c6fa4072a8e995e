//! Integration tests for the pending-operation store

use stagehand_store::PendingStore;
use stagehand_types::{ArtifactRecord, ArtifactStatus, BackendKind, SharedLib};

async fn open_store() -> (PendingStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = PendingStore::open(dir.path(), None).await.unwrap();
    (store, dir)
}

fn sample_record(package_id: &str) -> ArtifactRecord {
    ArtifactRecord::new_queued(package_id, 10, "Sample", 4096, 33)
}

#[tokio::test]
async fn upsert_and_get_round_trip() {
    let (store, _dir) = open_store().await;

    let record = sample_record("com.example.app")
        .with_shared_libs(vec![SharedLib::new("com.example.lib", 3)]);
    store.upsert(&record).await.unwrap();

    let loaded = store.get("com.example.app").await.unwrap().unwrap();
    assert_eq!(loaded, record);
    assert!(store.get("com.example.other").await.unwrap().is_none());
}

#[tokio::test]
async fn status_update_is_visible_in_snapshot() {
    let (store, _dir) = open_store().await;
    store.upsert(&sample_record("com.example.app")).await.unwrap();

    store
        .update_status("com.example.app", ArtifactStatus::AwaitingInstall)
        .await
        .unwrap();

    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].status, ArtifactStatus::AwaitingInstall);
}

#[tokio::test]
async fn subscription_sees_full_snapshots() {
    let (store, _dir) = open_store().await;
    let mut rx = store.subscribe();
    assert!(rx.borrow().is_empty());

    store.upsert(&sample_record("com.example.a")).await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().len(), 1);

    store.upsert(&sample_record("com.example.b")).await.unwrap();
    rx.changed().await.unwrap();
    // Full list, not a diff.
    let packages: Vec<String> = rx
        .borrow()
        .iter()
        .map(|record| record.package_id.clone())
        .collect();
    assert_eq!(packages, vec!["com.example.a", "com.example.b"]);
}

#[tokio::test]
async fn install_details_and_shared_libs_updates() {
    let (store, _dir) = open_store().await;
    store.upsert(&sample_record("com.example.app")).await.unwrap();

    store
        .update_install_details(
            "com.example.app",
            Some(BackendKind::Session),
            Some(42),
            Some(100),
            Some(1_700_000_000_000),
        )
        .await
        .unwrap();

    let libs = vec![SharedLib {
        package_id: "com.example.lib".to_string(),
        version_code: 5,
        backend: Some(BackendKind::Session),
        session_id: Some(43),
        install_progress: Some(50),
        installed_at: None,
    }];
    store
        .update_shared_libs("com.example.app", &libs)
        .await
        .unwrap();

    let loaded = store.get("com.example.app").await.unwrap().unwrap();
    assert_eq!(loaded.backend, Some(BackendKind::Session));
    assert_eq!(loaded.session_id, Some(42));
    assert_eq!(loaded.install_progress, Some(100));
    assert_eq!(loaded.installed_at, Some(1_700_000_000_000));
    assert_eq!(loaded.shared_libs, libs);
}

#[tokio::test]
async fn delete_and_delete_all() {
    let (store, _dir) = open_store().await;
    store.upsert(&sample_record("com.example.a")).await.unwrap();
    store.upsert(&sample_record("com.example.b")).await.unwrap();

    store.delete("com.example.a").await.unwrap();
    assert_eq!(store.snapshot().await.unwrap().len(), 1);

    store.delete_all().await.unwrap();
    assert!(store.snapshot().await.unwrap().is_empty());
}

#[tokio::test]
async fn reopen_preserves_records() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = PendingStore::open(dir.path(), None).await.unwrap();
        let mut record = sample_record("com.example.app");
        record.status = ArtifactStatus::AwaitingInstall;
        record.session_id = Some(7);
        store.upsert(&record).await.unwrap();
    }

    let store = PendingStore::open(dir.path(), None).await.unwrap();
    let loaded = store.get("com.example.app").await.unwrap().unwrap();
    assert_eq!(loaded.status, ArtifactStatus::AwaitingInstall);
    assert_eq!(loaded.session_id, Some(7));
}
