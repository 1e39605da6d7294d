mod cache;
mod progress;
mod session;
mod state;
mod store;

pub use cache::CacheKey;
pub use cache::CacheStore;
pub use cache::load_cached;
pub use cache::store_cached;
pub use progress::ProgressReporter;
pub use progress::ProgressSink;
pub use session::Session;
pub use session::SessionProvider;
pub use session::SessionStore;
pub use state::SyncStateStore;
pub use store::FileStore;
