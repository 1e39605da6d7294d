use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::time::interval;

use crate::{
    cli::Context,
    error, info,
    management::{FileStore, ProgressSink},
    success,
    sync::SyncService,
};

const POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Runs a full or incremental sync for the logged-in user.
///
/// The sync itself only writes its progress record; a separate task polls
/// that record and shows it on a spinner, the same way any other reader of
/// the record would.
pub async fn sync() {
    let ctx = Context::load();
    let credentials = ctx.credentials().await;

    let service = SyncService::new(
        Arc::new(ctx.client()),
        ctx.store.clone(),
        ctx.store.clone(),
        ctx.store.clone(),
    );

    let pb = ProgressBar::new_spinner();
    pb.set_message("Starting sync...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let poller = tokio::spawn(poll_progress(
        ctx.store.clone(),
        credentials.username.clone(),
        pb.clone(),
    ));

    let outcome = service.sync(&ctx.session).await;

    poller.abort();
    pb.finish_and_clear();

    if !outcome.success {
        error!("{}", outcome.message);
    }

    success!("{}", outcome.message);
    if let Some(report) = outcome.report {
        let mode = |full: bool| if full { "full" } else { "incremental" };
        info!(
            "Collection: {} fetch, {} new",
            mode(report.collection_full_fetch),
            report.collection_new
        );
        info!(
            "Wantlist: {} fetch, {} new",
            mode(report.wantlist_full_fetch),
            report.wantlist_new
        );
        info!("Folders: {}", report.folders);
    }
}

async fn poll_progress(store: Arc<FileStore>, username: String, pb: ProgressBar) {
    let mut ticker = interval(POLL_INTERVAL);
    loop {
        ticker.tick().await;
        match ProgressSink::get(store.as_ref(), &username).await {
            Ok(Some(progress)) => pb.set_message(progress.describe()),
            Ok(None) => {}
            Err(e) => tracing::debug!("cannot read sync progress: {}", e),
        }
    }
}
