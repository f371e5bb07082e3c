//! Session manager
//!
//! [`SessionManager`] is the single writer of [`SessionState`]. It drives
//! the login, registration, logout, refresh, and startup-restore flows,
//! persists the session snapshot, and owns the background refresh task.
//! Observers subscribe to state transitions through a watch channel
//! instead of reaching into shared mutable state.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::jwt;
use crate::scheduler::{self, RefreshTask};
use crate::state::{SessionPhase, SessionSnapshot, SessionState};
use crate::storage::{FileSessionStorage, SessionStorage};
use agora_client::AgoraClient;
use agora_client::error::ClientError;
use agora_client::types::{LoginRequest, RegisterRequest};
use agora_core::User;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

pub(crate) struct SessionInner {
    pub(crate) client: AgoraClient,
    pub(crate) config: SessionConfig,
    pub(crate) state: RwLock<SessionState>,
    pub(crate) watch_tx: watch::Sender<SessionState>,
    pub(crate) storage: Arc<dyn SessionStorage>,
    pub(crate) task: Mutex<Option<RefreshTask>>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        // Teardown cancels the refresh task exactly once.
        if let Some(task) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.stop();
        }
    }
}

#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl SessionManager {
    /// Create a manager with default timing and on-disk persistence.
    pub fn new(client: AgoraClient) -> Self {
        Self::with_config(client, SessionConfig::default())
    }

    pub fn with_config(client: AgoraClient, config: SessionConfig) -> Self {
        Self::with_storage(client, config, Arc::new(FileSessionStorage::default()))
    }

    pub fn with_storage(
        client: AgoraClient,
        config: SessionConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        let (watch_tx, _) = watch::channel(SessionState::default());
        let inner = Arc::new(SessionInner {
            client,
            config,
            state: RwLock::new(SessionState::default()),
            watch_tx,
            storage,
            task: Mutex::new(None),
        });

        // The client fires this when a token refresh terminally fails,
        // including refreshes it performed on its own behind a 401.
        // Weak reference: the client outliving the manager must not keep
        // the manager alive.
        let weak = Arc::downgrade(&inner);
        inner.client.set_session_expired_hook(move || {
            let Some(strong) = weak.upgrade() else { return };
            let manager = SessionManager { inner: strong };
            manager.stop_refresh_task();
            tokio::spawn(async move { manager.expire().await });
        });

        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<SessionInner>) -> Self {
        Self { inner }
    }

    /// The HTTP client this session rides on.
    pub fn client(&self) -> &AgoraClient {
        &self.inner.client
    }

    pub fn config(&self) -> SessionConfig {
        self.inner.config
    }

    /// Snapshot of the current session state.
    pub async fn state(&self) -> SessionState {
        self.inner.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state().await.is_authenticated()
    }

    /// Observe every state transition, starting from the current state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.watch_tx.subscribe()
    }

    /// Restore a persisted session, if a live one exists.
    ///
    /// Prefers the session snapshot (token plus cached profile, no network
    /// needed). Falls back to a bare persisted token, fetching the profile
    /// to go with it. An expired or rejected credential clears everything.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        if let Some(snapshot) = self.inner.storage.load().await? {
            if jwt::is_expired(&snapshot.token) {
                debug!("Persisted session has expired; discarding");
                self.clear_local(None).await;
                return Ok(());
            }

            self.inner.client.tokens().set(&snapshot.token).await?;
            let SessionSnapshot { token, user } = snapshot;
            info!("Session restored for {}", user.username);
            self.update_state(move |state| {
                *state = SessionState {
                    phase: SessionPhase::Authenticated,
                    user: Some(user),
                    token: Some(token),
                    error: None,
                };
            })
            .await;
            self.start_refresh_task();
            return Ok(());
        }

        match self.inner.client.tokens().load().await? {
            Some(token) if !jwt::is_expired(&token) => match self.inner.client.profile().await {
                Ok(user) => {
                    // The profile call may itself have rotated the token.
                    let token = self.inner.client.tokens().bearer().unwrap_or(token);
                    self.persist_snapshot(&token, &user).await;
                    info!("Session restored for {}", user.username);
                    let user = Some(user);
                    let token = Some(token);
                    self.update_state(move |state| {
                        *state = SessionState {
                            phase: SessionPhase::Authenticated,
                            user,
                            token,
                            error: None,
                        };
                    })
                    .await;
                    self.start_refresh_task();
                }
                Err(err) => {
                    warn!("Stored token rejected while fetching profile: {err}");
                    self.clear_local(None).await;
                }
            },
            Some(_) => {
                debug!("Persisted token has expired; discarding");
                self.clear_local(None).await;
            }
            None => {}
        }
        Ok(())
    }

    /// Log in and populate the session with the account's profile.
    ///
    /// On failure the session stays anonymous, nothing is persisted, and
    /// the failure message lands in [`SessionState::error`].
    pub async fn login(&self, credentials: LoginRequest) -> Result<User, SessionError> {
        self.update_state(|state| {
            *state = SessionState {
                phase: SessionPhase::Authenticating,
                ..SessionState::anonymous()
            };
        })
        .await;

        let token = match self.inner.client.login(&credentials).await {
            Ok(response) => response.access_token,
            Err(err) => return self.fail_login(err).await,
        };

        if let Err(err) = self.inner.client.tokens().set(&token).await {
            return self.fail_login(err).await;
        }

        // The token is only half the session; the profile fetch completes it.
        let user = match self.inner.client.profile().await {
            Ok(user) => user,
            Err(err) => return self.fail_login(err).await,
        };

        self.persist_snapshot(&token, &user).await;
        info!("Logged in as {}", user.username);

        let state_user = Some(user.clone());
        let state_token = Some(token);
        self.update_state(move |state| {
            *state = SessionState {
                phase: SessionPhase::Authenticated,
                user: state_user,
                token: state_token,
                error: None,
            };
        })
        .await;
        self.start_refresh_task();

        Ok(user)
    }

    /// Create a new account.
    ///
    /// A successful registration does not authenticate; callers send the
    /// new user through [`login`](Self::login) next.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, SessionError> {
        let user = self.inner.client.register(&request).await?;
        info!("Registered account {}", user.username);
        Ok(user)
    }

    /// End the session.
    ///
    /// The server-side logout is best effort: local state is cleared even
    /// when the remote call fails.
    pub async fn logout(&self) {
        self.stop_refresh_task();

        if let Err(err) = self.inner.client.logout().await {
            warn!("Remote logout failed: {err}");
        }

        self.clear_local(None).await;
        info!("Logged out");
    }

    /// Refresh the access token now.
    ///
    /// On failure the session is cleared; the refresh grant is gone and
    /// only a fresh login can recover.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let current = self.state().await;
        if current.token.is_none() {
            return Err(SessionError::NotAuthenticated);
        }

        self.update_state(|state| {
            state.phase = SessionPhase::Refreshing;
            state.error = None;
        })
        .await;

        match self.inner.client.refresh_access_token().await {
            Ok(token) => {
                if let Some(user) = current.user {
                    self.persist_snapshot(&token, &user).await;
                }
                self.update_state(move |state| {
                    state.phase = SessionPhase::Authenticated;
                    state.token = Some(token);
                })
                .await;
                debug!("Access token refreshed");
                Ok(())
            }
            Err(err) => {
                warn!("Session refresh failed: {err}");
                // The client already cleared the token store and fired the
                // expired hook; mirror it here so the caller need not wait
                // for the hook's task.
                self.stop_refresh_task();
                self.clear_local(Some(SESSION_EXPIRED_MESSAGE.to_string()))
                    .await;
                Err(err.into())
            }
        }
    }

    /// Tear down after a terminally failed refresh.
    pub(crate) async fn expire(&self) {
        info!("Session expired; clearing local state");
        self.clear_local(Some(SESSION_EXPIRED_MESSAGE.to_string()))
            .await;
    }

    async fn fail_login(&self, err: ClientError) -> Result<User, SessionError> {
        let err: SessionError = err.into();
        let message = err.message();

        // A failed login leaves nothing behind, including any previous
        // session's credentials.
        if let Err(clear_err) = self.inner.client.tokens().clear().await {
            warn!("Failed to clear stored token: {clear_err}");
        }
        if let Err(clear_err) = self.inner.storage.clear().await {
            warn!("Failed to clear session snapshot: {clear_err}");
        }

        self.update_state(move |state| {
            *state = SessionState::anonymous();
            state.error = Some(message);
        })
        .await;

        Err(err)
    }

    async fn persist_snapshot(&self, token: &str, user: &User) {
        let snapshot = SessionSnapshot {
            token: token.to_string(),
            user: user.clone(),
        };
        // Persistence is best effort; the in-memory session works without it.
        if let Err(err) = self.inner.storage.save(&snapshot).await {
            warn!("Failed to persist session snapshot: {err}");
        }
    }

    async fn clear_local(&self, error: Option<String>) {
        self.stop_refresh_task();
        if let Err(err) = self.inner.client.tokens().clear().await {
            warn!("Failed to clear stored token: {err}");
        }
        if let Err(err) = self.inner.storage.clear().await {
            warn!("Failed to clear session snapshot: {err}");
        }
        self.update_state(move |state| {
            *state = SessionState::anonymous();
            state.error = error;
        })
        .await;
    }

    async fn update_state(&self, mutate: impl FnOnce(&mut SessionState)) {
        let mut state = self.inner.state.write().await;
        mutate(&mut state);
        self.inner.watch_tx.send_replace(state.clone());
    }

    fn start_refresh_task(&self) {
        let mut slot = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Replacing an existing task keeps exactly one timer alive no
        // matter how often login/initialize run.
        if let Some(task) = slot.take() {
            task.stop();
        }
        *slot = Some(scheduler::spawn(
            Arc::downgrade(&self.inner),
            self.inner.config,
        ));
    }

    fn stop_refresh_task(&self) {
        let mut slot = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.take() {
            task.stop();
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("client", &self.inner.client)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
