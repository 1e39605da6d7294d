//! Error types for the sync client.
//!
//! Each concern gets its own enum so callers can match on what actually
//! failed: the HTTP transport, the Discogs API, the local stores, or the
//! configuration. [`SyncError`] only lives inside the orchestrator, which turns
//! it into a [`crate::sync::SyncOutcome`] before returning.

use thiserror::Error;

/// Failure below HTTP: DNS, connect, TLS, timeout, body read.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-retryable response (4xx or any other non-2xx, non-5xx status).
    #[error("Discogs API error: {status} {status_text} on {url}")]
    Remote {
        status: u16,
        status_text: String,
        url: String,
    },

    #[error("all {attempts} attempts to fetch {url} failed: {last}")]
    ExhaustedRetries {
        attempts: u32,
        url: String,
        last: String,
    },

    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limiter is no longer running")]
    LimiterClosed,
}

impl ApiError {
    /// HTTP status of a non-retryable remote failure, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },

    #[error("cannot load environment file: {0}")]
    Env(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
