//! # Discogs Integration Module
//!
//! Client for the parts of the Discogs API the sync needs. All calls go
//! through [`DiscogsClient::fetch_json`], which takes a permit from the shared
//! [`RateLimiter`] before every attempt and retries transient failures.
//!
//! ```text
//! Sync Orchestrator
//!          ↓
//! collect / enrich_details / resolve_masters / folders / identity
//!          ↓
//! fetch_json (retry + backoff)
//!          ↓
//! RateLimiter (single-owner window)  →  HttpTransport (reqwest)
//! ```
//!
//! ## Submodules
//!
//! - [`rate_limit`] - serialized N-per-window permit actor
//! - [`transport`] - request/response types and the `reqwest` transport
//! - [`client`] - the retrying client itself
//! - [`pagination`] - paginated walks with an incremental cutoff
//! - [`details`] - per-release details fan-out
//! - [`masters`] - wantlist master artwork fan-out
//! - [`user`] - identity, profile and folders
//!
//! ## Endpoints
//!
//! - `GET /oauth/identity`
//! - `GET /users/{username}`
//! - `GET /users/{username}/collection/folders`
//! - `GET /users/{username}/collection/folders/0/releases`
//! - `GET /users/{username}/wants`
//! - `GET /releases/{id}`
//! - `GET /masters/{id}`
//!
//! Every request carries a `User-Agent` (Discogs rejects requests without one)
//! and `Authorization: Discogs token=...`.

pub mod client;
pub mod details;
pub mod masters;
pub mod pagination;
pub mod rate_limit;
pub mod transport;
pub mod user;

pub use client::{DiscogsClient, RetryPolicy};
pub use pagination::Collected;
pub use rate_limit::RateLimiter;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
