use std::{
    fmt,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    error::StoreError,
    types::{Credentials, Identity},
};

const SESSION_FILE: &str = "session.json";

/// Answers "who is syncing" for the orchestrator.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn credentials(&self) -> Option<Credentials>;
}

/// A verified token together with the identity Discogs reported for it.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
    /// Unix timestamp of the login.
    pub obtained_at: i64,
}

impl Session {
    pub fn new(token: impl Into<String>, identity: Identity) -> Self {
        Self {
            token: token.into(),
            identity,
            obtained_at: Utc::now().timestamp(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.identity.username.clone(), self.token.clone())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"REDACTED")
            .field("identity", &self.identity)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Persists the logged-in [`Session`] as `session.json` in the data directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Option<Session>, StoreError> {
        match async_fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    pub async fn persist(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(session)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[async_trait]
impl SessionProvider for SessionStore {
    async fn credentials(&self) -> Option<Credentials> {
        match self.load().await {
            Ok(session) => session.map(|s| s.credentials()),
            Err(e) => {
                tracing::warn!("cannot read session {}: {}", self.path.display(), e);
                None
            }
        }
    }
}
