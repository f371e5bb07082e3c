//! Session snapshot persistence
//!
//! Mirrors the token storage in the client crate, but holds the larger
//! [`SessionSnapshot`] blob used to rehydrate the session at startup.

use crate::state::SessionSnapshot;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, warn};

/// Pluggable persistence backend for the session snapshot.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read the persisted snapshot, `None` when absent or unreadable.
    async fn load(&self) -> io::Result<Option<SessionSnapshot>>;

    /// Persist the snapshot, replacing any previous one.
    async fn save(&self, snapshot: &SessionSnapshot) -> io::Result<()>;

    /// Remove the persisted snapshot. Removing an absent one is not an error.
    async fn clear(&self) -> io::Result<()>;
}

/// Snapshot storage backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<data dir>/agora/session.json`.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agora")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSessionStorage {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self) -> io::Result<Option<SessionSnapshot>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        match serde_json::from_str(&contents) {
            Ok(snapshot) => Ok(Some(snapshot)),
            // A corrupt snapshot means "not logged in", not a hard failure.
            Err(err) => {
                warn!("Discarding unreadable session snapshot: {err}");
                Ok(None)
            }
        }
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let serialized = serde_json::to_string(snapshot).map_err(io::Error::other)?;
        fs::write(&self.path, serialized).await?;

        // Contains the bearer token; owner-readable only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, permissions).await?;
        }

        debug!("Session snapshot persisted to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// In-memory snapshot storage for tests.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    snapshot: Mutex<Option<SessionSnapshot>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self) -> io::Result<Option<SessionSnapshot>> {
        Ok(self.snapshot.lock().map_err(poisoned)?.clone())
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> io::Result<()> {
        *self.snapshot.lock().map_err(poisoned)? = Some(snapshot.clone());
        Ok(())
    }

    async fn clear(&self) -> io::Result<()> {
        *self.snapshot.lock().map_err(poisoned)? = None;
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> io::Error {
    io::Error::other("session storage lock poisoned")
}
