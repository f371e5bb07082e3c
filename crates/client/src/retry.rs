//! Silent token refresh on 401 responses
//!
//! Authenticated endpoints go through [`AgoraClient::execute_with_retry`]:
//! a 401 answer triggers one refresh of the access token and one resend of
//! the original request with the new credential. A request is never retried
//! more than once, and the refresh call itself uses the public pipeline, so
//! a 401 from the refresh endpoint cannot recurse into another refresh.
//!
//! Concurrent 401s coalesce behind a single refresh. The token store's
//! epoch counter records every credential rotation; a caller that finds the
//! epoch changed while it waited simply reuses the rotated token (or the
//! shared failure) instead of issuing its own refresh call.

use crate::client::AgoraClient;
use crate::error::{ApiError, ClientError};
use crate::types::TokenResponse;
use reqwest::{StatusCode, header};
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

impl AgoraClient {
    /// Exchange the refresh cookie for a new access token.
    ///
    /// The new token is stored before this returns. On failure the token
    /// store is cleared and the session-expired hook fires; callers get
    /// the refresh error.
    pub async fn refresh_access_token(&self) -> Result<String, ClientError> {
        self.refresh_from_epoch(self.tokens().epoch()).await
    }

    /// Refresh, unless the credential already rotated since `seen_epoch`.
    pub(crate) async fn refresh_from_epoch(&self, seen_epoch: u64) -> Result<String, ClientError> {
        if self.tokens().epoch() != seen_epoch {
            return self.reuse_rotated_token();
        }

        let _guard = self.refresh_gate.lock().await;
        // Re-check after the wait: whoever held the gate before us has
        // already rotated or cleared the token.
        if self.tokens().epoch() != seen_epoch {
            return self.reuse_rotated_token();
        }

        debug!("Refreshing access token");
        let request = self.public_request(reqwest::Method::POST, "/api/v1/auth/refresh");
        match self.execute::<TokenResponse>(request).await {
            Ok(response) => {
                self.tokens().set(&response.access_token).await?;
                Ok(response.access_token)
            }
            Err(err) => {
                warn!("Token refresh failed: {err}");
                if let Err(clear_err) = self.tokens().clear().await {
                    warn!("Failed to clear token after refresh failure: {clear_err}");
                }
                self.fire_session_expired();
                Err(err)
            }
        }
    }

    fn reuse_rotated_token(&self) -> Result<String, ClientError> {
        self.tokens().bearer().ok_or_else(|| {
            ClientError::Api(ApiError {
                status: 401,
                message: "Session expired".into(),
                errors: None,
            })
        })
    }

    /// Execute a request, refreshing the token and retrying once on 401.
    pub async fn execute_with_retry<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send_with_retry(request).await?;
        Self::decode_json(response).await
    }

    /// Like [`execute_with_retry`](Self::execute_with_retry) for endpoints
    /// that answer with an empty body.
    pub async fn execute_empty_with_retry(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(), ClientError> {
        let response = self.send_with_retry(request).await?;
        Self::ensure_success(response).await
    }

    /// Send `request`; on a 401 answer, refresh the token and resend the
    /// request exactly once with the new credential.
    async fn send_with_retry(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let sent_epoch = self.tokens().epoch();
        // Requests with streaming bodies cannot be cloned; those fail
        // without a retry below.
        let retry = request.try_clone();

        let response = request.send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let original = ClientError::Api(ApiError::from_response(response).await);
        let Some(retry) = retry else {
            return Err(original);
        };

        debug!("Received 401, attempting token refresh");
        let Ok(token) = self.refresh_from_epoch(sent_epoch).await else {
            // The refresh path already cleared the session and fired the
            // expired hook; the caller sees the original 401.
            return Err(original);
        };

        let mut retried = retry.build()?;
        retried
            .headers_mut()
            .insert(header::AUTHORIZATION, bearer_value(&token)?);
        Ok(self.http().execute(retried).await?)
    }
}

fn bearer_value(token: &str) -> Result<header::HeaderValue, ClientError> {
    header::HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ClientError::Configuration("token contains invalid header characters".into()))
}
