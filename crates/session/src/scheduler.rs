//! Background token refresh
//!
//! A periodic task that inspects the active token's expiry claim and
//! refreshes it shortly before it lapses, so interactive requests never
//! pay the refresh round-trip. The task holds only a weak reference to
//! the session; dropping the last manager handle stops it.

use crate::config::SessionConfig;
use crate::jwt;
use crate::manager::{SessionInner, SessionManager};
use std::sync::Weak;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub(crate) struct RefreshTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RefreshTask {
    pub(crate) fn stop(self) {
        self.cancel.cancel();
        drop(self.handle);
    }
}

pub(crate) fn spawn(inner: Weak<SessionInner>, config: SessionConfig) -> RefreshTask {
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(run(inner, config, cancel.clone()));
    RefreshTask { cancel, handle }
}

async fn run(inner: Weak<SessionInner>, config: SessionConfig, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(config.check_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // An interval fires immediately; the first real check happens one
    // full period after the session was established.
    ticker.tick().await;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(inner) = inner.upgrade() else { break };
                let manager = SessionManager::from_inner(inner);
                if !check_once(&manager).await {
                    break;
                }
            }
        }
    }
}

/// One timer tick. Returns false when the task has nothing left to do.
async fn check_once(manager: &SessionManager) -> bool {
    let Some(token) = manager.state().await.token else {
        debug!("No active session; stopping refresh task");
        return false;
    };

    let Some(claims) = jwt::decode(&token) else {
        warn!("Active token is not decodable; clearing session");
        manager.expire().await;
        return false;
    };

    let Some(exp) = claims.exp else {
        debug!("Active token carries no expiry; refresh not needed");
        return false;
    };

    let threshold = i64::try_from(manager.config().refresh_threshold.as_secs()).unwrap_or(i64::MAX);
    let remaining = exp - chrono::Utc::now().timestamp();
    if remaining > threshold {
        return true;
    }

    // An already-expired token is still worth one attempt; the refresh
    // grant may outlive the access token.
    debug!(remaining, "Access token nearing expiry; refreshing");
    match manager.refresh().await {
        Ok(()) => true,
        Err(err) => {
            warn!("Background refresh failed: {err}");
            false
        }
    }
}
