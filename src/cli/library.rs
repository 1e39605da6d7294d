use clap::ValueEnum;
use tabled::Table;

use crate::{
    cli::Context,
    error, info,
    management::{CacheKey, CacheStore, ProgressSink, SyncStateStore, load_cached},
    success,
    types::{CollectionRelease, DuplicateTableRow, ReleaseTableRow, WantlistRelease},
    utils, warning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListResource {
    Collection,
    Wantlist,
}

/// Prints the cached collection or wantlist as a table. `search` keeps only
/// releases whose title or artist contains it, ignoring case.
pub async fn list(resource: ListResource, search: Option<String>) {
    let ctx = Context::load();
    let credentials = ctx.credentials().await;
    let username = credentials.username.as_str();
    let cache = ctx.store.as_ref();

    let rows: Vec<ReleaseTableRow> = match resource {
        ListResource::Collection => {
            let Some(releases) =
                load_cached::<Vec<CollectionRelease>>(cache, username, CacheKey::Collection).await
            else {
                warning!("No cached collection. Run `discogs-sync sync` first.");
                return;
            };
            utils::filter_releases(&releases, search.as_deref())
                .iter()
                .map(utils::release_row)
                .collect()
        }
        ListResource::Wantlist => {
            let Some(releases) =
                load_cached::<Vec<WantlistRelease>>(cache, username, CacheKey::Wantlist).await
            else {
                warning!("No cached wantlist. Run `discogs-sync sync` first.");
                return;
            };
            utils::filter_releases(&releases, search.as_deref())
                .iter()
                .map(utils::release_row)
                .collect()
        }
    };

    if rows.is_empty() {
        info!("Nothing found");
        return;
    }

    let count = rows.len();
    println!("{}", Table::new(rows));
    info!("{} releases", count);
}

/// Prints groups of collection releases that share a master release.
pub async fn duplicates() {
    let ctx = Context::load();
    let credentials = ctx.credentials().await;

    let Some(collection) = load_cached::<Vec<CollectionRelease>>(
        ctx.store.as_ref(),
        &credentials.username,
        CacheKey::Collection,
    )
    .await
    else {
        warning!("No cached collection. Run `discogs-sync sync` first.");
        return;
    };

    let groups = utils::find_duplicates(&collection);
    if groups.is_empty() {
        success!("No duplicates in {} releases", collection.len());
        return;
    }

    let rows: Vec<DuplicateTableRow> = groups
        .iter()
        .filter_map(|group| {
            let first = group.first()?;
            Some(DuplicateTableRow {
                master: first.basic_information.master_id,
                artist: first.basic_information.primary_artist().to_string(),
                title: first.basic_information.title.clone(),
                copies: group.len(),
            })
        })
        .collect();

    println!("{}", Table::new(rows));
    warning!("{} masters owned more than once", groups.len());
}

/// Deletes the cached lists, sync state and progress record of the
/// logged-in user. The session is kept.
pub async fn clear() {
    let ctx = Context::load();
    let credentials = ctx.credentials().await;
    let username = credentials.username.as_str();
    let store = ctx.store.as_ref();

    if let Err(e) = CacheStore::clear(store, username).await {
        error!("Cannot clear cache: {}", e);
    }
    if let Err(e) = SyncStateStore::clear(store, username).await {
        error!("Cannot clear sync state: {}", e);
    }
    if let Err(e) = ProgressSink::clear(store, username).await {
        error!("Cannot clear sync progress: {}", e);
    }

    success!("Cleared cached data of {}", username);
}
