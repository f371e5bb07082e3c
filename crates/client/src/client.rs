//! Agora HTTP client
//!
//! [`AgoraClient`] wraps a [`reqwest::Client`] pointed at one Agora server.
//! It owns the [`TokenStore`] that holds the current bearer token and
//! splits outgoing traffic into two pipelines: [`request`](AgoraClient::request)
//! attaches the stored bearer, [`public_request`](AgoraClient::public_request)
//! never does. The refresh endpoint and the login/register calls go through
//! the public pipeline, which is what keeps a failing refresh from ever
//! triggering another refresh.

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};
use crate::retry::SessionExpiredHook;
use crate::storage::{FileTokenStorage, TokenStorage};
use crate::token::TokenStore;
use reqwest::{Client, ClientBuilder, header};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Agora API client
#[derive(Clone)]
pub struct AgoraClient {
    client: Client,
    base_url: String,
    tokens: TokenStore,
    pub(crate) refresh_gate: Arc<tokio::sync::Mutex<()>>,
    pub(crate) expired_hook: Arc<RwLock<Option<SessionExpiredHook>>>,
}

impl AgoraClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> AgoraClientBuilder {
        AgoraClientBuilder::default()
    }

    /// Build a client from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::builder()
            .base_url(&config.base_url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .token_storage(Arc::new(FileTokenStorage::new(config.token_path())))
            .build()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token store backing this client's Authorization headers.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Create a request builder carrying the stored bearer token, if any
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(token) = self.tokens.bearer() {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        request
    }

    /// Create a request builder with no Authorization header
    pub fn public_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Execute a request and decode the JSON response body
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        Self::decode_json(response).await
    }

    /// Execute a request whose response body is empty or irrelevant
    pub async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), ClientError> {
        let response = request.send().await?;
        Self::ensure_success(response).await
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(ClientError::Api(ApiError::from_response(response).await))
        }
    }

    pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<(), ClientError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::Api(ApiError::from_response(response).await))
        }
    }

    /// Register a callback fired when a token refresh terminally fails.
    ///
    /// The session layer hooks this to tear down its state; the callback
    /// must be cheap and non-blocking.
    pub fn set_session_expired_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self
            .expired_hook
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(hook));
    }

    pub(crate) fn fire_session_expired(&self) {
        let hook = self
            .expired_hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

impl std::fmt::Debug for AgoraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgoraClient")
            .field("base_url", &self.base_url)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Builder for AgoraClient
#[derive(Default)]
pub struct AgoraClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    token_storage: Option<Arc<dyn TokenStorage>>,
}

impl AgoraClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the token persistence backend
    pub fn token_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.token_storage = Some(storage);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<AgoraClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        url::Url::parse(&base_url)
            .map_err(|err| ClientError::Configuration(format!("invalid base_url: {err}")))?;

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder = client_builder.user_agent("agora-client/0.1.0");
        }

        // The refresh grant lives in a server-set cookie.
        let client = client_builder.cookie_store(true).build()?;

        let storage = self
            .token_storage
            .unwrap_or_else(|| Arc::new(FileTokenStorage::default()));

        Ok(AgoraClient {
            client,
            base_url,
            tokens: TokenStore::new(storage),
            refresh_gate: Arc::new(tokio::sync::Mutex::new(())),
            expired_hook: Arc::new(RwLock::new(None)),
        })
    }
}
