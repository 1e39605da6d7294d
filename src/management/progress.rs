use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::{error::StoreError, management::FileStore, types::SyncProgress};

const PROGRESS_RECORD: &str = "sync-progress";

/// Holds the single overwrite-in-place progress record of a user. No record
/// means idle.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn set(&self, username: &str, progress: &SyncProgress) -> Result<(), StoreError>;

    async fn get(&self, username: &str) -> Result<Option<SyncProgress>, StoreError>;

    async fn clear(&self, username: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl ProgressSink for FileStore {
    async fn set(&self, username: &str, progress: &SyncProgress) -> Result<(), StoreError> {
        self.write(&self.path_for(username, PROGRESS_RECORD), progress)
            .await
    }

    async fn get(&self, username: &str) -> Result<Option<SyncProgress>, StoreError> {
        self.read(&self.path_for(username, PROGRESS_RECORD)).await
    }

    async fn clear(&self, username: &str) -> Result<(), StoreError> {
        self.remove(&self.path_for(username, PROGRESS_RECORD)).await
    }
}

enum Command {
    Set(SyncProgress),
    Clear,
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget front of a [`ProgressSink`].
///
/// Updates are queued to one writer task and applied in the order they were
/// emitted, so the caller never waits on the sink and a slow write can never
/// be overtaken by a later one. Write failures are logged and otherwise
/// ignored. The writer stops once every clone of the reporter is dropped.
#[derive(Clone)]
pub struct ProgressReporter {
    commands: mpsc::UnboundedSender<Command>,
}

impl ProgressReporter {
    pub fn spawn(sink: Arc<dyn ProgressSink>, username: impl Into<String>) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        tokio::spawn(write_progress(sink, username.into(), rx));
        Self { commands }
    }

    pub fn emit(&self, progress: SyncProgress) {
        self.send(Command::Set(progress));
    }

    /// Removes the record once every earlier update has been written.
    pub fn clear(&self) {
        self.send(Command::Clear);
    }

    /// Resolves when everything emitted before this call has been applied.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        self.send(Command::Flush(done));
        let _ = wait.await;
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("progress writer has stopped, dropping update");
        }
    }
}

async fn write_progress(
    sink: Arc<dyn ProgressSink>,
    username: String,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Set(progress) => {
                if let Err(e) = sink.set(&username, &progress).await {
                    tracing::warn!("cannot write sync progress for {}: {}", username, e);
                }
            }
            Command::Clear => {
                if let Err(e) = sink.clear(&username).await {
                    tracing::warn!("cannot clear sync progress for {}: {}", username, e);
                }
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
