mod common;

use std::sync::Arc;

use discogs_sync::{
    management::{
        CacheKey, CacheStore, FileStore, ProgressReporter, ProgressSink, Session, SessionProvider,
        SessionStore, SyncStateStore, load_cached, store_cached,
    },
    types::{
        CollectionRelease, Identity, ItemProgress, SyncPhase, SyncProgress, SyncResource,
        SyncState,
    },
};
use tempfile::TempDir;

use common::{USERNAME, collection};

fn file_store() -> (TempDir, FileStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    (dir, store)
}

#[tokio::test]
async fn test_cache_round_trip() {
    let (_dir, store) = file_store();
    let items = collection(1, 3, 100);

    store_cached(&store, USERNAME, CacheKey::Collection, &items)
        .await
        .unwrap();
    let loaded: Vec<CollectionRelease> = load_cached(&store, USERNAME, CacheKey::Collection)
        .await
        .unwrap();

    assert_eq!(loaded, items);
}

#[tokio::test]
async fn test_missing_records_are_none() {
    let (_dir, store) = file_store();

    assert!(
        CacheStore::get(&store, USERNAME, CacheKey::Wantlist)
            .await
            .unwrap()
            .is_none()
    );
    assert!(SyncStateStore::get(&store, USERNAME).await.unwrap().is_none());
    assert!(ProgressSink::get(&store, USERNAME).await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_names_use_sanitized_username() {
    let (dir, store) = file_store();

    store_cached(&store, "DJ Shadow!", CacheKey::Folders, &Vec::<u32>::new())
        .await
        .unwrap();
    SyncStateStore::set(&store, "DJ Shadow!", &SyncState::default())
        .await
        .unwrap();

    assert!(dir.path().join("dj_shadow_-folders.json").is_file());
    assert!(dir.path().join("dj_shadow_-sync-info.json").is_file());
    // No temp files left behind
    let leftovers = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_users_do_not_share_records() {
    let (_dir, store) = file_store();

    store_cached(&store, "alice", CacheKey::Collection, &collection(1, 2, 10))
        .await
        .unwrap();

    let bob: Option<Vec<CollectionRelease>> =
        load_cached(&store, "bob", CacheKey::Collection).await;
    assert!(bob.is_none());
}

#[tokio::test]
async fn test_sync_state_uses_camel_case_fields() {
    let (dir, store) = file_store();
    let state = SyncState {
        collection_last_added: Some("2024-05-01T10:00:00-07:00".to_string()),
        wantlist_last_added: None,
    };

    SyncStateStore::set(&store, USERNAME, &state).await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join(format!("{}-sync-info.json", USERNAME)))
        .unwrap();
    assert!(raw.contains("collectionLastAdded"));
    assert!(!raw.contains("wantlistLastAdded"));
    assert_eq!(
        SyncStateStore::get(&store, USERNAME).await.unwrap(),
        Some(state)
    );
}

#[tokio::test]
async fn test_unreadable_cache_is_a_miss() {
    let (_dir, store) = file_store();
    let path = store.path_for(USERNAME, "collection");
    std::fs::write(&path, "{ not json").unwrap();

    let loaded: Option<Vec<CollectionRelease>> =
        load_cached(&store, USERNAME, CacheKey::Collection).await;
    assert!(loaded.is_none());

    // Valid JSON of the wrong shape is a miss too
    std::fs::write(&path, "{\"releases\": 3}").unwrap();
    let loaded: Option<Vec<CollectionRelease>> =
        load_cached(&store, USERNAME, CacheKey::Collection).await;
    assert!(loaded.is_none());
}

#[tokio::test]
async fn test_clear_removes_every_record() {
    let (dir, store) = file_store();

    for key in CacheKey::ALL {
        store_cached(&store, USERNAME, key, &Vec::<u32>::new())
            .await
            .unwrap();
    }
    SyncStateStore::set(&store, USERNAME, &SyncState::default())
        .await
        .unwrap();
    ProgressSink::set(&store, USERNAME, &SyncProgress::idle())
        .await
        .unwrap();

    CacheStore::clear(&store, USERNAME).await.unwrap();
    SyncStateStore::clear(&store, USERNAME).await.unwrap();
    ProgressSink::clear(&store, USERNAME).await.unwrap();

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    // Clearing again is fine
    CacheStore::clear(&store, USERNAME).await.unwrap();
    SyncStateStore::clear(&store, USERNAME).await.unwrap();
}

#[tokio::test]
async fn test_reporter_applies_updates_in_order() {
    let (_dir, store) = file_store();
    let sink: Arc<dyn ProgressSink> = Arc::new(store.clone());
    let reporter = ProgressReporter::spawn(sink, USERNAME);

    for processed in 1..=20 {
        reporter.emit(SyncProgress::items(ItemProgress {
            processed,
            total: 20,
            resource: SyncResource::CollectionDetails,
        }));
    }
    reporter.flush().await;

    let record = ProgressSink::get(&store, USERNAME).await.unwrap().unwrap();
    assert_eq!(record.status, SyncPhase::Processing);
    assert_eq!(record.processed, Some(20));
    assert_eq!(record.total, Some(20));

    reporter.clear();
    reporter.flush().await;
    assert!(ProgressSink::get(&store, USERNAME).await.unwrap().is_none());
}

#[tokio::test]
async fn test_reporter_writes_through_memory_sink() {
    let store = common::MemoryStore::new();
    let reporter = ProgressReporter::spawn(store.clone(), USERNAME);

    reporter.emit(SyncProgress::phase(SyncPhase::Starting, "Starting sync"));
    reporter.emit(SyncProgress::phase(SyncPhase::Caching, "Saving to cache"));
    reporter.clear();
    reporter.flush().await;

    let history = store.progress_history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].as_ref().map(|p| p.status), Some(SyncPhase::Starting));
    assert_eq!(history[1].as_ref().map(|p| p.status), Some(SyncPhase::Caching));
    assert!(history[2].is_none());
}

#[tokio::test]
async fn test_session_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let sessions = SessionStore::new(dir.path());

    assert!(sessions.load().await.unwrap().is_none());
    assert!(sessions.credentials().await.is_none());

    let identity = Identity {
        id: 1,
        username: USERNAME.to_string(),
        resource_url: format!("{}/users/{}", common::BASE_URL, USERNAME),
        avatar_url: None,
    };
    sessions
        .persist(&Session::new(common::TOKEN, identity.clone()))
        .await
        .unwrap();

    let session = sessions.load().await.unwrap().unwrap();
    assert_eq!(session.identity, identity);
    assert_eq!(sessions.credentials().await, Some(common::credentials()));

    sessions.clear().await.unwrap();
    assert!(sessions.credentials().await.is_none());
    assert!(!sessions.path().exists());
}

#[tokio::test]
async fn test_corrupt_session_means_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let sessions = SessionStore::new(dir.path());
    std::fs::write(sessions.path(), "garbage").unwrap();

    assert!(sessions.load().await.is_err());
    assert!(sessions.credentials().await.is_none());
}

#[test]
fn test_session_debug_hides_token() {
    let identity = Identity {
        id: 1,
        username: USERNAME.to_string(),
        resource_url: String::new(),
        avatar_url: None,
    };
    let printed = format!("{:?}", Session::new(common::TOKEN, identity));

    assert!(!printed.contains(common::TOKEN));
    assert!(printed.contains(USERNAME));
}
