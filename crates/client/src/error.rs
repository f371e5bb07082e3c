//! Client error types
//!
//! Every failure a caller sees is reducible to [`ApiError`], a uniform
//! `{status, message, errors}` triple. Server responses carry their real
//! HTTP status; transport failures that never produced a response are
//! reported with status 0.

use serde::Deserialize;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error; no HTTP response was received
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Token persistence failed
    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// HTTP status associated with this error, 0 when none exists.
    pub fn status(&self) -> u16 {
        match self {
            Self::Api(api) => api.status,
            Self::Request(err) => err.status().map_or(0, |status| status.as_u16()),
            _ => 0,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == 401
    }

    /// Collapse into the uniform error shape the UI layer renders.
    pub fn normalized(&self) -> ApiError {
        match self {
            Self::Api(api) => api.clone(),
            other => ApiError {
                status: other.status(),
                message: other.to_string(),
                errors: None,
            },
        }
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Normalized server error
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Server error {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    /// Per-field detail list some endpoints attach to validation failures
    pub errors: Option<Vec<String>>,
}

/// Error body shape the Agora API uses. Older endpoints put the text under
/// `error`, newer ones under `message`; both may carry a detail list.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    errors: Option<Vec<String>>,
}

impl ApiError {
    /// Build the normalized error from a non-success response.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        match response.text().await {
            Ok(body) => Self::from_body(status.as_u16(), &status.to_string(), &body),
            // The status line arrived but the body did not; report what we have.
            Err(err) => Self {
                status: status.as_u16(),
                message: err.to_string(),
                errors: None,
            },
        }
    }

    /// Extract `message`/`errors` from a response body, preferring the
    /// `error` field, then `message`, then the status line itself.
    fn from_body(status: u16, status_line: &str, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let (message, errors) = match parsed {
            Some(body) => (body.error.or(body.message), body.errors),
            None => (None, None),
        };
        Self {
            status,
            message: message.unwrap_or_else(|| status_line.to_string()),
            errors,
        }
    }
}
