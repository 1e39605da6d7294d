//! # Sync Orchestrator
//!
//! Runs one complete sync of a user's collection, wantlist and folders and
//! commits the result to the cache.
//!
//! ```text
//! starting
//!   → fetching(collection) → fetching(wantlist)
//!   → processing(collection_details) → processing(wantlist_details)
//!   → processing(wantlist_masters)
//!   → caching → done → (record cleared)
//! error from any step
//! ```
//!
//! Each transition is written to the [`ProgressSink`] through a
//! [`ProgressReporter`]. Nothing is written to the cache until every fetch has
//! succeeded, so a failed sync leaves the previous cache as it was. A commit
//! that fails halfway puts the earlier lists back and drops the stored
//! cutoffs.
//!
//! ## Incremental syncs
//!
//! The `date_added` of the newest item of each list is stored as
//! [`SyncState`] after a successful sync. The next sync walks each list newest
//! first and stops at that item, then prepends what it found to the cached
//! list. A resource with a stored cutoff but no cached list is fetched in full.

use std::{collections::HashSet, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    discogs::DiscogsClient,
    error::{StoreError, SyncError},
    management::{
        CacheKey, CacheStore, ProgressReporter, ProgressSink, SessionProvider, SyncStateStore,
        load_cached, store_cached,
    },
    types::{
        CollectionRelease, Credentials, Folder, ItemProgress, PageProgress, Release, SyncPhase,
        SyncProgress, SyncResource, SyncState, WantlistRelease,
    },
};

/// Counts describing what a successful sync did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub collection_new: usize,
    pub collection_total: usize,
    pub collection_full_fetch: bool,
    pub wantlist_new: usize,
    pub wantlist_total: usize,
    pub wantlist_full_fetch: bool,
    pub folders: usize,
}

impl SyncReport {
    pub fn summary(&self) -> String {
        format!(
            "Synced {} new collection items ({} total) and {} new wantlist items ({} total)",
            self.collection_new, self.collection_total, self.wantlist_new, self.wantlist_total
        )
    }
}

/// Result of [`SyncService::sync`]. Failures are reported here, never as a
/// returned error.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub success: bool,
    pub message: String,
    pub report: Option<SyncReport>,
}

impl SyncOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            report: None,
        }
    }
}

pub struct SyncService {
    client: Arc<DiscogsClient>,
    cache: Arc<dyn CacheStore>,
    state: Arc<dyn SyncStateStore>,
    progress: Arc<dyn ProgressSink>,
}

impl SyncService {
    pub fn new(
        client: Arc<DiscogsClient>,
        cache: Arc<dyn CacheStore>,
        state: Arc<dyn SyncStateStore>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            client,
            cache,
            state,
            progress,
        }
    }

    /// Syncs the user `session` is logged in as. Without credentials nothing
    /// is fetched or written.
    pub async fn sync(&self, session: &dyn SessionProvider) -> SyncOutcome {
        match session.credentials().await {
            Some(credentials) => self.sync_user(&credentials).await,
            None => SyncOutcome::failed(SyncError::NotAuthenticated.to_string()),
        }
    }

    pub async fn sync_user(&self, credentials: &Credentials) -> SyncOutcome {
        let reporter = ProgressReporter::spawn(self.progress.clone(), &credentials.username);

        match self.run(credentials, &reporter).await {
            Ok(report) => {
                tracing::info!("sync of {} finished: {:?}", credentials.username, report);
                reporter.emit(SyncProgress::phase(SyncPhase::Done, report.summary()));
                reporter.clear();
                reporter.flush().await;
                SyncOutcome {
                    success: true,
                    message: report.summary(),
                    report: Some(report),
                }
            }
            Err(e) => {
                let message = format!("Sync failed: {}", e);
                tracing::warn!("sync of {} failed: {}", credentials.username, e);
                reporter.emit(SyncProgress::phase(SyncPhase::Error, message.clone()));
                reporter.flush().await;
                SyncOutcome::failed(message)
            }
        }
    }

    async fn run(
        &self,
        credentials: &Credentials,
        reporter: &ProgressReporter,
    ) -> Result<SyncReport, SyncError> {
        let username = credentials.username.as_str();
        reporter.emit(SyncProgress::phase(SyncPhase::Starting, "Starting sync"));

        let prior = match self.state.get(username).await {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("cannot read sync state of {}, syncing everything: {}", username, e);
                SyncState::default()
            }
        };

        let (previous_collection, collection_cutoff) = self
            .previous_items::<CollectionRelease>(
                username,
                CacheKey::Collection,
                prior.collection_last_added,
            )
            .await;
        let (previous_wantlist, wantlist_cutoff) = self
            .previous_items::<WantlistRelease>(
                username,
                CacheKey::Wantlist,
                prior.wantlist_last_added,
            )
            .await;

        let on_page = |p: PageProgress| reporter.emit(SyncProgress::page(p));
        reporter.emit(
            SyncProgress::phase(SyncPhase::Fetching, "Fetching your collection")
                .with_resource(SyncResource::Collection),
        );
        let collection = self
            .client
            .collection(credentials, collection_cutoff.as_deref(), on_page)
            .await?;
        reporter.emit(
            SyncProgress::phase(SyncPhase::Fetching, "Fetching your wantlist")
                .with_resource(SyncResource::Wantlist),
        );
        let wantlist = self
            .client
            .wantlist(credentials, wantlist_cutoff.as_deref(), on_page)
            .await?;

        reporter.emit(SyncProgress::phase(SyncPhase::Fetching, "Fetching folders"));
        let folders = self.client.folders(credentials).await?;

        let on_item = |p: ItemProgress| reporter.emit(SyncProgress::items(p));

        reporter.emit(
            SyncProgress::phase(SyncPhase::Processing, "Fetching release details")
                .with_resource(SyncResource::CollectionDetails),
        );
        let new_collection = self
            .client
            .enrich_details(
                collection.items,
                credentials,
                SyncResource::CollectionDetails,
                on_item,
            )
            .await;

        reporter.emit(
            SyncProgress::phase(SyncPhase::Processing, "Fetching release details")
                .with_resource(SyncResource::WantlistDetails),
        );
        let new_wantlist = self
            .client
            .enrich_details(
                wantlist.items,
                credentials,
                SyncResource::WantlistDetails,
                on_item,
            )
            .await;

        reporter.emit(
            SyncProgress::phase(SyncPhase::Processing, "Fetching master releases")
                .with_resource(SyncResource::WantlistMasters),
        );
        let new_wantlist = self
            .client
            .resolve_masters(new_wantlist, credentials, on_item)
            .await;

        let collection_new = new_collection.len();
        let wantlist_new = new_wantlist.len();
        let merged_collection =
            merge_items(new_collection, previous_collection, collection.was_full_fetch);
        let merged_wantlist = merge_items(new_wantlist, previous_wantlist, wantlist.was_full_fetch);

        reporter.emit(SyncProgress::phase(SyncPhase::Caching, "Saving to cache"));
        if let Err(e) = self
            .commit(username, &merged_collection, &merged_wantlist, &folders)
            .await
        {
            // the lists are restored, but a cutoff must not outlive a failed commit
            if let Err(clear_err) = self.state.clear(username).await {
                tracing::warn!("cannot reset sync state of {}: {}", username, clear_err);
            }
            return Err(e.into());
        }

        Ok(SyncReport {
            collection_new,
            collection_total: merged_collection.len(),
            collection_full_fetch: collection.was_full_fetch,
            wantlist_new,
            wantlist_total: merged_wantlist.len(),
            wantlist_full_fetch: wantlist.was_full_fetch,
            folders: folders.len(),
        })
    }

    /// Cached items of a resource together with the cutoff to sync it from.
    /// The cutoff is dropped when there is nothing cached to merge onto.
    async fn previous_items<T: DeserializeOwned>(
        &self,
        username: &str,
        key: CacheKey,
        cutoff: Option<String>,
    ) -> (Vec<T>, Option<String>) {
        let Some(cutoff) = cutoff else {
            return (Vec::new(), None);
        };

        match load_cached::<Vec<T>>(self.cache.as_ref(), username, key).await {
            Some(items) => (items, Some(cutoff)),
            None => {
                tracing::warn!("no cached {} for {}, fetching it in full", key, username);
                (Vec::new(), None)
            }
        }
    }

    /// Writes the lists and the new cutoffs. On failure every list is put
    /// back the way it was before the call.
    async fn commit(
        &self,
        username: &str,
        collection: &[CollectionRelease],
        wantlist: &[WantlistRelease],
        folders: &[Folder],
    ) -> Result<(), StoreError> {
        let cache = self.cache.as_ref();
        let mut snapshot = Vec::with_capacity(CacheKey::ALL.len());
        for key in CacheKey::ALL {
            snapshot.push((key, cache.get(username, key).await?));
        }

        let written = async {
            store_cached(cache, username, CacheKey::Collection, collection).await?;
            store_cached(cache, username, CacheKey::Wantlist, wantlist).await?;
            store_cached(cache, username, CacheKey::Folders, folders).await?;

            let state = SyncState {
                collection_last_added: collection.first().map(|r| r.date_added.clone()),
                wantlist_last_added: wantlist.first().map(|r| r.date_added.clone()),
            };
            self.state.set(username, &state).await
        }
        .await;

        if written.is_err() {
            self.restore(username, snapshot).await;
        }
        written
    }

    async fn restore(&self, username: &str, snapshot: Vec<(CacheKey, Option<Value>)>) {
        let cache = self.cache.as_ref();
        for (key, previous) in snapshot {
            let restored = match previous {
                Some(value) => cache.set(username, key, &value).await,
                None => cache.remove(username, key).await,
            };
            if let Err(e) = restored {
                tracing::warn!("cannot restore cached {} of {}: {}", key, username, e);
            }
        }
    }
}

/// Combines freshly fetched items with the cached ones.
///
/// A full fetch replaces the cache. Otherwise the new items go in front of the
/// cached ones, and cached items whose key reappears among the new ones are
/// dropped.
pub fn merge_items<T: Release>(new_items: Vec<T>, previous: Vec<T>, full_fetch: bool) -> Vec<T> {
    if full_fetch {
        return new_items;
    }

    let seen: HashSet<u64> = new_items.iter().map(Release::cache_key).collect();
    let mut merged = new_items;
    merged.extend(
        previous
            .into_iter()
            .filter(|item| !seen.contains(&item.cache_key())),
    );
    merged
}
