//! Agora session lifecycle
//!
//! Builds the authentication session on top of `agora-client`: a
//! [`SessionManager`] that logs in, restores persisted sessions at
//! startup, keeps the access token fresh in the background, and
//! broadcasts every state transition to subscribers.

pub mod config;
pub mod error;
pub mod jwt;
pub mod manager;
mod scheduler;
pub mod state;
pub mod storage;

pub use config::SessionConfig;
pub use error::SessionError;
pub use jwt::TokenClaims;
pub use manager::SessionManager;
pub use state::{SessionPhase, SessionSnapshot, SessionState};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
