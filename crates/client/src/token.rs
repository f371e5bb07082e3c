//! In-memory token store with persistence
//!
//! [`TokenStore`] is the single authority for the current bearer token.
//! Outgoing requests read the in-memory copy; the [`TokenStorage`] backend
//! exists so the token survives a restart. `set` persists before it
//! activates the new token; `clear` drops the in-memory token even when
//! the storage write fails.

use crate::error::ClientError;
use crate::storage::TokenStorage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

#[derive(Clone)]
pub struct TokenStore {
    bearer: Arc<RwLock<Option<String>>>,
    epoch: Arc<AtomicU64>,
    storage: Arc<dyn TokenStorage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            bearer: Arc::new(RwLock::new(None)),
            epoch: Arc::new(AtomicU64::new(0)),
            storage,
        }
    }

    /// Current in-memory bearer token, if any.
    pub fn bearer(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Monotonic counter bumped on every `set`/`clear`.
    ///
    /// Lets a caller that observed a 401 detect that someone else already
    /// rotated the credential while it waited its turn to refresh.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Persist `token` and make it the active bearer.
    pub async fn set(&self, token: &str) -> Result<(), ClientError> {
        self.storage.save(token).await?;
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        self.epoch.fetch_add(1, Ordering::AcqRel);
        debug!("Bearer token updated");
        Ok(())
    }

    /// Drop the active bearer and remove it from storage.
    ///
    /// The in-memory token is cleared even when the storage write fails;
    /// a dead credential must never outlive the session that owned it.
    pub async fn clear(&self) -> Result<(), ClientError> {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.storage.clear().await?;
        debug!("Bearer token cleared");
        Ok(())
    }

    /// Read the persisted token without touching the in-memory state.
    pub async fn get(&self) -> Result<Option<String>, ClientError> {
        Ok(self.storage.load().await?)
    }

    /// Hydrate the in-memory bearer from storage, typically at startup.
    ///
    /// Returns the loaded token. Unlike [`set`](Self::set) this does not
    /// write storage back.
    pub async fn load(&self) -> Result<Option<String>, ClientError> {
        let token = self.storage.load().await?;
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = token.clone();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        Ok(token)
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("bearer", &self.bearer().map(|_| "<redacted>"))
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStorage;

    fn store() -> TokenStore {
        TokenStore::new(Arc::new(MemoryTokenStorage::new()))
    }

    #[tokio::test]
    async fn set_updates_memory_and_storage() {
        let store = store();
        assert_eq!(store.bearer(), None);

        store.set("tok-1").await.unwrap();
        assert_eq!(store.bearer(), Some("tok-1".to_string()));
        assert_eq!(store.get().await.unwrap(), Some("tok-1".to_string()));
    }

    #[tokio::test]
    async fn clear_removes_both_copies() {
        let store = store();
        store.set("tok-1").await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.bearer(), None);
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn epoch_advances_on_every_mutation() {
        let store = store();
        let e0 = store.epoch();
        store.set("tok-1").await.unwrap();
        let e1 = store.epoch();
        store.clear().await.unwrap();
        let e2 = store.epoch();
        assert!(e0 < e1 && e1 < e2);
    }

    #[tokio::test]
    async fn load_hydrates_memory_from_storage() {
        let backing = Arc::new(MemoryTokenStorage::new());
        backing.save("persisted").await.unwrap();

        let store = TokenStore::new(backing);
        assert_eq!(store.bearer(), None);

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, Some("persisted".to_string()));
        assert_eq!(store.bearer(), Some("persisted".to_string()));
    }
}
