use std::fmt;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{error::StoreError, management::FileStore};

/// The per-user lists a sync writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Collection,
    Wantlist,
    Folders,
}

impl CacheKey {
    pub const ALL: [CacheKey; 3] = [CacheKey::Collection, CacheKey::Wantlist, CacheKey::Folders];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Collection => "collection",
            CacheKey::Wantlist => "wantlist",
            CacheKey::Folders => "folders",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, username: &str, key: CacheKey) -> Result<Option<Value>, StoreError>;

    async fn set(&self, username: &str, key: CacheKey, value: &Value) -> Result<(), StoreError>;

    /// Removes one cached list. Removing a missing list is not an error.
    async fn remove(&self, username: &str, key: CacheKey) -> Result<(), StoreError>;

    /// Removes every cached list of `username`.
    async fn clear(&self, username: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl CacheStore for FileStore {
    async fn get(&self, username: &str, key: CacheKey) -> Result<Option<Value>, StoreError> {
        self.read(&self.path_for(username, key.as_str())).await
    }

    async fn set(&self, username: &str, key: CacheKey, value: &Value) -> Result<(), StoreError> {
        self.write(&self.path_for(username, key.as_str()), value)
            .await
    }

    async fn remove(&self, username: &str, key: CacheKey) -> Result<(), StoreError> {
        FileStore::remove(self, &self.path_for(username, key.as_str())).await
    }

    async fn clear(&self, username: &str) -> Result<(), StoreError> {
        for key in CacheKey::ALL {
            CacheStore::remove(self, username, key).await?;
        }
        Ok(())
    }
}

/// Reads a cached list as `T`. A failed read or a record that no longer
/// decodes is logged and treated like a miss.
pub async fn load_cached<T: DeserializeOwned>(
    cache: &dyn CacheStore,
    username: &str,
    key: CacheKey,
) -> Option<T> {
    let value = match cache.get(username, key).await {
        Ok(value) => value?,
        Err(e) => {
            tracing::warn!("cannot read cached {} for {}: {}", key, username, e);
            return None;
        }
    };

    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("ignoring unreadable cached {} for {}: {}", key, username, e);
            None
        }
    }
}

/// Serializes `value` and stores it as the cached list `key` of `username`.
///
/// # Arguments
///
/// * `cache` - Store to write to
/// * `username` - Owner of the list, sanitized by the store
/// * `key` - Which list is replaced
/// * `value` - Anything serializable, usually a slice of releases
///
/// # Example
///
/// ```ignore
/// store_cached(&store, "crate_digger", CacheKey::Folders, &folders).await?;
/// ```
pub async fn store_cached<T: Serialize + ?Sized>(
    cache: &dyn CacheStore,
    username: &str,
    key: CacheKey,
    value: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(value)?;
    cache.set(username, key, &value).await
}
