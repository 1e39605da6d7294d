use crate::{
    cli::Context,
    error, info,
    management::{CacheKey, ProgressSink, SyncStateStore, load_cached},
    success,
    types::{CollectionRelease, Folder, SyncPhase, WantlistRelease},
    warning,
};

/// Prints the Discogs profile of the logged-in user.
pub async fn whoami() {
    let ctx = Context::load();
    let credentials = ctx.credentials().await;

    let profile = match ctx.client().user_profile(&credentials).await {
        Ok(profile) => profile,
        Err(e) => error!("Cannot load profile of {}: {}", credentials.username, e),
    };

    success!("Logged in as {}", profile.username);
    if let Some(name) = profile.name.as_deref().filter(|n| !n.is_empty()) {
        info!("Name: {}", name);
    }
    if let Some(location) = profile.location.as_deref().filter(|l| !l.is_empty()) {
        info!("Location: {}", location);
    }
    info!("Collection: {} releases", profile.num_collection);
    info!("Wantlist: {} releases", profile.num_wantlist);
    if !profile.registered.is_empty() {
        let since = profile.registered.get(..10).unwrap_or(&profile.registered);
        info!("Member since {}", since);
    }
}

/// Prints the progress record of a running or failed sync, `idle` otherwise.
pub async fn status() {
    let ctx = Context::load();
    let credentials = ctx.credentials().await;

    match ProgressSink::get(ctx.store.as_ref(), &credentials.username).await {
        Ok(Some(progress)) if progress.status == SyncPhase::Error => {
            warning!("{}", progress.describe())
        }
        Ok(Some(progress)) => info!("{}", progress.describe()),
        Ok(None) => info!("{}", SyncPhase::Idle),
        Err(e) => error!("Cannot read sync progress: {}", e),
    }
}

/// Counts of what is cached for the logged-in user and the stored cutoffs.
pub async fn info() {
    let ctx = Context::load();
    let credentials = ctx.credentials().await;
    let username = credentials.username.as_str();
    let cache = ctx.store.as_ref();

    let collection = load_cached::<Vec<CollectionRelease>>(cache, username, CacheKey::Collection)
        .await
        .unwrap_or_default();
    let wantlist = load_cached::<Vec<WantlistRelease>>(cache, username, CacheKey::Wantlist)
        .await
        .unwrap_or_default();
    let folders = load_cached::<Vec<Folder>>(cache, username, CacheKey::Folders)
        .await
        .unwrap_or_default();

    info!("User: {}", username);
    info!("Cache: {}", ctx.store.root().display());
    info!("Collection: {} releases", collection.len());
    info!("Wantlist: {} releases", wantlist.len());
    info!(
        "Folders: {}",
        folders
            .iter()
            .map(|f| format!("{} ({})", f.name, f.count))
            .collect::<Vec<_>>()
            .join(", ")
    );

    match SyncStateStore::get(ctx.store.as_ref(), username).await {
        Ok(Some(state)) => {
            info!(
                "Newest collection item: {}",
                state.collection_last_added.as_deref().unwrap_or("-")
            );
            info!(
                "Newest wantlist item: {}",
                state.wantlist_last_added.as_deref().unwrap_or("-")
            );
        }
        Ok(None) => warning!("Never synced. Run `discogs-sync sync`."),
        Err(e) => warning!("Cannot read sync state: {}", e),
    }
}
