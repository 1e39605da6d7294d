use async_trait::async_trait;

use crate::{error::StoreError, management::FileStore, types::SyncState};

const SYNC_STATE_RECORD: &str = "sync-info";

/// Where the incremental cutoffs of the last successful sync are kept.
#[async_trait]
pub trait SyncStateStore: Send + Sync {
    async fn get(&self, username: &str) -> Result<Option<SyncState>, StoreError>;

    async fn set(&self, username: &str, state: &SyncState) -> Result<(), StoreError>;

    async fn clear(&self, username: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl SyncStateStore for FileStore {
    async fn get(&self, username: &str) -> Result<Option<SyncState>, StoreError> {
        self.read(&self.path_for(username, SYNC_STATE_RECORD)).await
    }

    async fn set(&self, username: &str, state: &SyncState) -> Result<(), StoreError> {
        self.write(&self.path_for(username, SYNC_STATE_RECORD), state)
            .await
    }

    async fn clear(&self, username: &str) -> Result<(), StoreError> {
        self.remove(&self.path_for(username, SYNC_STATE_RECORD))
            .await
    }
}
