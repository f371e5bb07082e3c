//! Bearer token persistence
//!
//! The access token survives process restarts through a [`TokenStorage`]
//! backend. The default backend is a single file under the platform data
//! directory; tests swap in the in-memory backend.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::debug;

/// Pluggable persistence backend for the raw bearer token string.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Read the persisted token, `None` when nothing is stored.
    async fn load(&self) -> io::Result<Option<String>>;

    /// Persist the token, replacing any previous value.
    async fn save(&self, token: &str) -> io::Result<()>;

    /// Remove the persisted token. Removing an absent token is not an error.
    async fn clear(&self) -> io::Result<()>;
}

/// Token storage backed by a single file.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<data dir>/agora/token`.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agora")
            .join("token")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileTokenStorage {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(token) => {
                let token = token.trim().to_string();
                Ok((!token.is_empty()).then_some(token))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, token).await?;

        // The token grants account access; keep it owner-readable only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, permissions).await?;
        }

        debug!("Token persisted to {}", self.path.display());
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

/// In-memory token storage for tests and short-lived clients.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn load(&self) -> io::Result<Option<String>> {
        Ok(self.token.lock().map_err(poisoned)?.clone())
    }

    async fn save(&self, token: &str) -> io::Result<()> {
        *self.token.lock().map_err(poisoned)? = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> io::Result<()> {
        *self.token.lock().map_err(poisoned)? = None;
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> io::Error {
    io::Error::other("token storage lock poisoned")
}
