//! Store behaviour when the service cannot be reached at all.
//!
//! Points the store at a port nobody listens on, so every request fails in
//! the transport and the store has to commit locally.

use record_core::{
    CommitSource, FallbackPolicy, HttpRecordService, RecordDraft, RecordPatch, RecordService,
    RecordStore, ServiceError, StoreError,
};

/// Base URL of a port that was bound and released, so connects are refused.
fn unreachable_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn offline_store() -> RecordStore<HttpRecordService> {
    RecordStore::new(HttpRecordService::connect(&unreachable_base()))
}

#[tokio::test]
async fn service_reports_transport_errors() {
    let service = HttpRecordService::connect(&unreachable_base());
    let err = service.list().await.unwrap_err();
    assert!(matches!(err, ServiceError::Transport(_)), "got {err:?}");
    assert!(err.is_connectivity());
}

#[tokio::test]
async fn fetch_keeps_seed_data() {
    let store = offline_store();
    let before = store.items();

    store.fetch_items().await.unwrap();

    assert_eq!(store.items(), before);
    assert!(!store.is_loading());
    assert!(store.error().is_none());
    assert_eq!(store.last_commit(), Some(CommitSource::Fallback));
}

#[tokio::test]
async fn create_appends_local_record() {
    let store = offline_store();

    let created = store.create_item(RecordDraft::new("A")).await.unwrap();

    let items = store.items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[2], created);
    assert_eq!(created.title, "A");
    assert_eq!(created.description, "");
    assert!(created.id != "1" && created.id != "2");
    assert_eq!(created.created_at, created.updated_at);
}

#[tokio::test]
async fn update_merges_locally() {
    let store = offline_store();
    let prior = store.get("1").unwrap();

    let updated = store.update_item("1", RecordPatch::title("B")).await.unwrap();

    assert_eq!(updated.title, "B");
    assert_eq!(updated.description, prior.description);
    assert!(updated.updated_at >= prior.updated_at);
    assert_eq!(store.get("1"), Some(updated));
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found() {
    let store = offline_store();
    let before = store.items();

    let err = store
        .update_item("999", RecordPatch::title("X"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound { ref id } if id == "999"));
    assert_eq!(store.items(), before);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn delete_removes_locally() {
    let store = offline_store();
    store.delete_item("2").await.unwrap();
    assert!(store.get("2").is_none());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn connectivity_policy_still_falls_back_when_offline() {
    let store = offline_store().with_fallback(FallbackPolicy::Connectivity);
    let created = store.create_item(RecordDraft::new("offline")).await.unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.get(&created.id), Some(created));
}
