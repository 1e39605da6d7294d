use crate::{
    discogs::DiscogsClient,
    error::ApiError,
    types::{
        CollectionPage, CollectionRelease, Credentials, PageProgress, PagedResponse, Release,
        SyncResource, WantlistPage, WantlistRelease,
    },
    utils,
};

/// Items gathered by a paginated walk.
#[derive(Debug, Clone)]
pub struct Collected<T> {
    pub items: Vec<T>,
    /// `false` when the walk stopped at the incremental cutoff.
    pub was_full_fetch: bool,
}

impl DiscogsClient {
    /// Walks a paginated resource from `start_url` by following each page's
    /// `next` URL.
    ///
    /// Without a cutoff the walk ends when a page has no `next` URL or no
    /// items. With a cutoff (an RFC 3339 `date_added`), the first item added
    /// at or before it ends the walk and only the items before it are kept.
    /// This relies on the resource being sorted newest-added first.
    ///
    /// `on_page` is called after every successfully fetched page.
    pub async fn collect<R>(
        &self,
        start_url: &str,
        credentials: &Credentials,
        resource: SyncResource,
        cutoff: Option<&str>,
        mut on_page: impl FnMut(PageProgress),
    ) -> Result<Collected<R::Item>, ApiError>
    where
        R: PagedResponse,
        R::Item: Release,
    {
        let cutoff = match cutoff {
            Some(raw) => match utils::parse_added(raw) {
                Some(parsed) => Some(parsed),
                None => {
                    tracing::warn!(
                        "ignoring unparseable {} cutoff {:?}, fetching everything",
                        resource,
                        raw
                    );
                    None
                }
            },
            None => None,
        };

        let mut items: Vec<R::Item> = Vec::new();
        let mut next_url = Some(start_url.to_string());
        let mut fetched_pages: u32 = 0;

        while let Some(url) = next_url.take() {
            tracing::debug!("[Discogs API] fetching page: {}", utils::redact_token(&url));
            let page = self.fetch_json::<R>(&url, credentials).await?.into_page();
            fetched_pages += 1;

            on_page(PageProgress {
                page: if page.pagination.page > 0 {
                    page.pagination.page
                } else {
                    fetched_pages
                },
                pages: page.pagination.pages.max(fetched_pages),
                resource,
            });

            if page.items.is_empty() {
                break;
            }

            if let Some(cutoff) = &cutoff {
                let stop_at = page
                    .items
                    .iter()
                    .position(|item| utils::added_at_or_before(item.date_added(), cutoff));

                if let Some(stop_at) = stop_at {
                    items.extend(page.items.into_iter().take(stop_at));
                    return Ok(Collected {
                        items,
                        was_full_fetch: false,
                    });
                }
            }

            items.extend(page.items);
            next_url = page.pagination.urls.next;
        }

        Ok(Collected {
            items,
            was_full_fetch: true,
        })
    }

    /// The user's whole collection (folder 0), newest added first.
    pub async fn collection(
        &self,
        credentials: &Credentials,
        cutoff: Option<&str>,
        on_page: impl FnMut(PageProgress),
    ) -> Result<Collected<CollectionRelease>, ApiError> {
        // incremental cutoffs need sort=added&sort_order=desc
        let url = format!(
            "{base}/users/{user}/collection/folders/0/releases?sort=added&sort_order=desc&per_page={per_page}",
            base = self.base_url(),
            user = credentials.username,
            per_page = self.per_page()
        );
        self.collect::<CollectionPage>(
            &url,
            credentials,
            SyncResource::Collection,
            cutoff,
            on_page,
        )
        .await
    }

    /// The user's wantlist, newest added first.
    pub async fn wantlist(
        &self,
        credentials: &Credentials,
        cutoff: Option<&str>,
        on_page: impl FnMut(PageProgress),
    ) -> Result<Collected<WantlistRelease>, ApiError> {
        let url = format!(
            "{base}/users/{user}/wants?sort=added&sort_order=desc&per_page={per_page}",
            base = self.base_url(),
            user = credentials.username,
            per_page = self.per_page()
        );
        self.collect::<WantlistPage>(&url, credentials, SyncResource::Wantlist, cutoff, on_page)
            .await
    }
}
