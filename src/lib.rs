//! Discogs Sync Library
//!
//! Keeps a local, incrementally refreshed copy of a Discogs user's collection,
//! wantlist and collection folders. Every request to Discogs passes a shared
//! rate limiter and is retried on transient failures; per-release details and
//! wantlist master artwork are fetched with bounded concurrency, and the
//! result is committed to per-user JSON caches in one step at the end.
//!
//! # Modules
//!
//! - `cli` - Command-line interface implementations
//! - `config` - Settings from environment variables and `.env`
//! - `discogs` - Rate-limited, retrying Discogs API client
//! - `error` - Error types
//! - `management` - Cache, sync state, progress and session stores
//! - `sync` - The sync orchestrator
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use discogs_sync::{config, discogs::DiscogsClient, management, sync::SyncService};
//!
//! #[tokio::main]
//! async fn main() -> discogs_sync::Res<()> {
//!     config::load_env().await?;
//!     let settings = config::Settings::from_env()?;
//!     let store = Arc::new(management::FileStore::new(&settings.data_dir));
//!     let service = SyncService::new(
//!         Arc::new(DiscogsClient::new(&settings)?),
//!         store.clone(),
//!         store.clone(),
//!         store,
//!     );
//!     let outcome = service
//!         .sync(&management::SessionStore::new(&settings.data_dir))
//!         .await;
//!     println!("{}", outcome.message);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod discogs;
pub mod error;
pub mod management;
pub mod sync;
pub mod types;
pub mod utils;

/// Result alias for the command-line layer.
///
/// Library code returns the typed errors from [`error`]; the CLI glue boxes
/// whatever reaches it so commands can use `?` across all of them.
///
/// # Example
///
/// ```
/// use discogs_sync::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational line prefixed with a blue `o`.
///
/// # Arguments
///
/// A format string and its values, exactly as for `println!`.
///
/// # Example
///
/// ```ignore
/// info!("Logged in as {}", username);
/// info!("No cached wantlist");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a line prefixed with a green checkmark after a command succeeded.
///
/// # Arguments
///
/// A format string and its values, exactly as for `println!`.
///
/// # Example
///
/// ```ignore
/// success!("Synced {} releases", report.collection_total);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a line prefixed with a red `!` and exits with status 1.
///
/// Only for failures the command cannot continue from. Anything after the
/// invocation is unreachable.
///
/// ```ignore
/// error!("Not logged in. Run discogs-sync login first.");
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a line prefixed with a yellow `!` for problems the command can
/// continue past.
///
/// # Example
///
/// ```ignore
/// warning!("Last sync failed: {}", message);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
