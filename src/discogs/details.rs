use futures::{StreamExt, stream};

use crate::{
    discogs::DiscogsClient,
    error::ApiError,
    types::{Credentials, FullRelease, ItemProgress, Release, SyncResource},
};

impl DiscogsClient {
    /// Fetches one release from `/releases/{id}`.
    ///
    /// # Arguments
    ///
    /// * `release_id` - Discogs release id, not a collection instance id
    /// * `credentials` - Token the request is authorized with
    ///
    /// # Example
    ///
    /// ```ignore
    /// let release = client.release(2464521, &credentials).await?;
    /// println!("{:?}", release.details.genres);
    /// ```
    pub async fn release(
        &self,
        release_id: u64,
        credentials: &Credentials,
    ) -> Result<FullRelease, ApiError> {
        let url = format!("{}/releases/{}", self.base_url(), release_id);
        self.fetch_json::<FullRelease>(&url, credentials).await
    }

    /// Attaches the full-release details to each item.
    ///
    /// Lookups run with bounded concurrency. A failed lookup is logged and the
    /// item is returned as it came in; the batch itself never fails. The
    /// returned items are in input order, and `on_progress` is called once per
    /// item with `processed` counting up from 1.
    pub async fn enrich_details<T: Release>(
        &self,
        items: Vec<T>,
        credentials: &Credentials,
        resource: SyncResource,
        mut on_progress: impl FnMut(ItemProgress),
    ) -> Vec<T> {
        let total = items.len();
        if total == 0 {
            return items;
        }

        let client = self;
        let mut lookups = stream::iter(items.into_iter().enumerate())
            .map(|(idx, item)| async move {
                let result = client.release(item.release_id(), credentials).await;
                (idx, item, result)
            })
            .buffer_unordered(self.concurrency());

        let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
        let mut processed = 0;

        while let Some((idx, mut item, result)) = lookups.next().await {
            match result {
                Ok(full) => item.attach_details(full.details),
                Err(e) => {
                    tracing::warn!(
                        "failed to fetch details for release {}: {}",
                        item.release_id(),
                        e
                    );
                }
            }
            slots[idx] = Some(item);
            processed += 1;
            on_progress(ItemProgress {
                processed,
                total,
                resource,
            });
        }

        slots.into_iter().flatten().collect()
    }
}
