//! # CLI Module
//!
//! User-facing commands of `discogs-sync`. Each command builds what it needs
//! from [`Settings`](crate::config::Settings), talks to the stores in
//! [`crate::management`] and, where it has to, the Discogs API, and reports the
//! result with the crate's `info!`/`success!`/`warning!`/`error!` macros.
//!
//! ## Commands
//!
//! ### Session
//!
//! - [`login`] - verifies a personal access token and stores the session
//! - [`logout`] - forgets the stored session
//! - [`whoami`] - prints the Discogs profile of the logged-in user
//!
//! ### Sync
//!
//! - [`sync`] - runs a sync while rendering its progress record
//! - [`status`] - prints the current progress record
//!
//! ### Cached data
//!
//! - [`info`] - counts of what is cached and when it was last synced
//! - [`list`] - collection or wantlist as a table, optionally searched
//! - [`duplicates`] - collection releases that share a master release
//! - [`clear`] - deletes everything cached for the logged-in user
//!
//! ## Usage
//!
//! ```bash
//! discogs-sync login --token <TOKEN>
//! discogs-sync sync
//! discogs-sync list collection --search "miles davis"
//! discogs-sync duplicates
//! ```
//!
//! Failures that end a command go through `error!`, which exits with status 1.

use std::sync::Arc;

use crate::{
    config::Settings,
    discogs::DiscogsClient,
    error,
    management::{FileStore, SessionProvider, SessionStore},
    types::Credentials,
};

mod auth;
mod info;
mod library;
mod sync;

pub use auth::login;
pub use auth::logout;
pub use info::info;
pub use info::status;
pub use info::whoami;
pub use library::ListResource;
pub use library::clear;
pub use library::duplicates;
pub use library::list;
pub use sync::sync;

/// What every command works against.
struct Context {
    settings: Settings,
    store: Arc<FileStore>,
    session: SessionStore,
}

impl Context {
    fn load() -> Self {
        let settings = match Settings::from_env() {
            Ok(settings) => settings,
            Err(e) => error!("Invalid settings: {}", e),
        };
        let store = Arc::new(FileStore::new(&settings.data_dir));
        let session = SessionStore::new(&settings.data_dir);
        Self {
            settings,
            store,
            session,
        }
    }

    fn client(&self) -> DiscogsClient {
        match DiscogsClient::new(&self.settings) {
            Ok(client) => client,
            Err(e) => error!("Cannot create HTTP client: {}", e),
        }
    }

    async fn credentials(&self) -> Credentials {
        match self.session.credentials().await {
            Some(credentials) => credentials,
            None => error!("Not logged in. Run `discogs-sync login` first."),
        }
    }
}
