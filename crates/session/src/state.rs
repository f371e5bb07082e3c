//! Session state
//!
//! [`SessionState`] is the single source of truth for "who is logged in".
//! Only the [`SessionManager`](crate::SessionManager) writes it; everyone
//! else observes it through a watch channel.

use crate::jwt;
use agora_core::User;
use serde::{Deserialize, Serialize};

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No credentials; nothing in flight
    Anonymous,
    /// A login attempt is in flight
    Authenticating,
    /// Logged in with a live token
    Authenticated,
    /// Logged in; a token refresh is in flight
    Refreshing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub user: Option<User>,
    pub token: Option<String>,
    /// Message of the most recent failure, cleared by the next attempt
    pub error: Option<String>,
}

impl SessionState {
    pub fn anonymous() -> Self {
        Self {
            phase: SessionPhase::Anonymous,
            user: None,
            token: None,
            error: None,
        }
    }

    /// True iff a token is present and its expiry lies in the future.
    ///
    /// Derived from the token rather than the phase, so a session whose
    /// token silently expired stops counting as authenticated even before
    /// the manager notices.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !jwt::is_expired(token))
    }

    /// True while a login or refresh is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, SessionPhase::Authenticating | SessionPhase::Refreshing)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// What gets persisted between runs: the token plus the profile it
/// belongs to, so a restart can restore the session without a network
/// round trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub token: String,
    pub user: User,
}
