//! Configuration management for discogs-sync.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Everything has a default matching what
//! the Discogs API tolerates for an authenticated user, so an empty
//! environment yields a working [`Settings`].
//!
//! The lookup order is:
//! 1. Environment variables
//! 2. `.env` file in the local data directory
//! 3. Defaults

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::error::ConfigError;

pub const APP_DIR: &str = "discogs-sync";

pub const DEFAULT_API_URL: &str = "https://api.discogs.com";
pub const DEFAULT_USER_AGENT: &str = concat!("DiscogsSync/", env!("CARGO_PKG_VERSION"));
/// Discogs allows 60 authenticated requests per minute; stay just under it.
pub const DEFAULT_RATE_LIMIT: usize = 58;
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_PER_PAGE: u32 = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns the platform local data directory for the application.
///
/// - Linux: `~/.local/share/discogs-sync`
/// - macOS: `~/Library/Application Support/discogs-sync`
/// - Windows: `%LOCALAPPDATA%/discogs-sync`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Loads environment variables from `.env` in the local data directory.
///
/// Creates the directory if needed. A missing `.env` file is not an error;
/// a present but unreadable one is.
pub async fn load_env() -> Result<(), ConfigError> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::Env(e.to_string()))?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| ConfigError::Env(e.to_string()))?;
    }
    Ok(())
}

/// Runtime settings for the API client and the local stores.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub user_agent: String,
    pub rate_limit: usize,
    pub rate_window: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub concurrency: usize,
    pub per_page: u32,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window: DEFAULT_RATE_WINDOW,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF,
            concurrency: DEFAULT_CONCURRENCY,
            per_page: DEFAULT_PER_PAGE,
            request_timeout: DEFAULT_TIMEOUT,
            data_dir: data_dir(),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("DISCOGS_API_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        let user_agent = lookup("DISCOGS_USER_AGENT").unwrap_or(defaults.user_agent);
        let data_dir = lookup("DISCOGS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        Ok(Self {
            api_url,
            user_agent,
            rate_limit: parse(&lookup, "DISCOGS_RATE_LIMIT")?.unwrap_or(defaults.rate_limit),
            rate_window: parse(&lookup, "DISCOGS_RATE_WINDOW_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_window),
            max_attempts: parse(&lookup, "DISCOGS_MAX_ATTEMPTS")?
                .unwrap_or(defaults.max_attempts),
            backoff_base: parse(&lookup, "DISCOGS_BACKOFF_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff_base),
            concurrency: parse(&lookup, "DISCOGS_CONCURRENCY")?.unwrap_or(defaults.concurrency),
            per_page: parse(&lookup, "DISCOGS_PER_PAGE")?.unwrap_or(defaults.per_page),
            request_timeout: parse(&lookup, "DISCOGS_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            data_dir,
        })
    }

    /// Token from `DISCOGS_TOKEN`, if set and non-empty.
    pub fn token_from_env() -> Option<String> {
        env::var("DISCOGS_TOKEN").ok().filter(|t| !t.trim().is_empty())
    }
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
