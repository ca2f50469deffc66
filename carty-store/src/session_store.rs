use async_trait::async_trait;
use carty_shared::models::User;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::StoreResult;

/// Durable storage for the signed-in user.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` when nothing is stored; `Err(StoreError::Corrupt)` for an unreadable entry.
    async fn load(&self) -> StoreResult<Option<User>>;
    async fn save(&self, user: &User) -> StoreResult<()>;
    async fn clear(&self) -> StoreResult<()>;
}

/// Keeps the session as a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> StoreResult<Option<User>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn save(&self, user: &User) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let raw = serde_json::to_string_pretty(user)?;
        tokio::fs::write(&self.path, raw).await?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store holding the serialized entry, as the file store would.
#[derive(Default)]
pub struct MemorySessionStore {
    raw: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an arbitrary stored entry, e.g. a corrupt one.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    pub async fn raw(&self) -> Option<String> {
        self.raw.lock().await.clone()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> StoreResult<Option<User>> {
        match self.raw.lock().await.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, user: &User) -> StoreResult<()> {
        *self.raw.lock().await = Some(serde_json::to_string(user)?);
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        *self.raw.lock().await = None;
        Ok(())
    }
}
