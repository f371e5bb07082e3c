//! Session error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The underlying API call failed
    #[error(transparent)]
    Client(#[from] agora_client::ClientError),

    /// The operation needs an authenticated session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Session persistence failed
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl SessionError {
    /// User-facing message for this failure.
    pub fn message(&self) -> String {
        match self {
            Self::Client(err) => err.normalized().message,
            other => other.to_string(),
        }
    }
}
