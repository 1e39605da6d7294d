use futures::{StreamExt, stream};

use crate::{
    discogs::DiscogsClient,
    error::ApiError,
    types::{Credentials, ItemProgress, MasterRelease, SyncResource, WantlistRelease},
};

impl DiscogsClient {
    /// Fetches a master release from `/masters/{id}`.
    ///
    /// # Arguments
    ///
    /// * `master_id` - Id of the master; callers skip ids `<= 0`
    /// * `credentials` - Token the request is authorized with
    pub async fn master(
        &self,
        master_id: i64,
        credentials: &Credentials,
    ) -> Result<MasterRelease, ApiError> {
        let url = format!("{}/masters/{}", self.base_url(), master_id);
        self.fetch_json::<MasterRelease>(&url, credentials).await
    }

    /// Fills in `master_cover_image` and `master_year` for wantlist items.
    ///
    /// Items without a master (`master_id <= 0`) are never looked up; they
    /// carry their own cover image forward. For the rest the master's primary
    /// image wins, falling back to the item's own cover when the master has
    /// none or the lookup fails. Output order matches input order.
    pub async fn resolve_masters(
        &self,
        items: Vec<WantlistRelease>,
        credentials: &Credentials,
        mut on_progress: impl FnMut(ItemProgress),
    ) -> Vec<WantlistRelease> {
        let total = items.len();
        if total == 0 {
            return items;
        }

        let client = self;
        let mut lookups = stream::iter(items.into_iter().enumerate())
            .map(|(idx, item)| async move { (idx, client.attach_master(item, credentials).await) })
            .buffer_unordered(self.concurrency());

        let mut slots: Vec<Option<WantlistRelease>> = (0..total).map(|_| None).collect();
        let mut processed = 0;

        while let Some((idx, item)) = lookups.next().await {
            slots[idx] = Some(item);
            processed += 1;
            on_progress(ItemProgress {
                processed,
                total,
                resource: SyncResource::WantlistMasters,
            });
        }

        slots.into_iter().flatten().collect()
    }

    async fn attach_master(
        &self,
        mut item: WantlistRelease,
        credentials: &Credentials,
    ) -> WantlistRelease {
        let own_cover = item.basic_information.cover_image.clone();

        if !item.basic_information.has_master() {
            item.master_cover_image = Some(own_cover);
            return item;
        }

        match self.master(item.basic_information.master_id, credentials).await {
            Ok(master) => {
                item.master_cover_image = Some(
                    master
                        .primary_image()
                        .map(str::to_string)
                        .unwrap_or(own_cover),
                );
                item.master_year = master.year;
            }
            Err(e) => {
                tracing::warn!(
                    "failed to fetch master {} for {}: {}",
                    item.basic_information.master_id,
                    item.basic_information.title,
                    e
                );
                item.master_cover_image = Some(own_cover);
            }
        }
        item
    }
}
