//! Client configuration

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for [`AgoraClient`](crate::AgoraClient).
///
/// Values come from defaults, an optional config file, and `AGORA_*`
/// environment variables, in that order of precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the Agora API server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Directory holding the persisted token and session files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "agora-client/0.1.0".to_string()
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agora")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            data_dir: default_data_dir(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a file, with environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ClientError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("AGORA"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load configuration from defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> Result<Self, ClientError> {
        let defaults = Self::default();

        let settings = config::Config::builder()
            // Set default values
            .set_default("base_url", defaults.base_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?
            .add_source(config::Environment::with_prefix("AGORA"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Path of the persisted bearer token file.
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join("token")
    }
}
