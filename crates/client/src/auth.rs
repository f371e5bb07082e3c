//! Authentication API client methods

use crate::client::AgoraClient;
use crate::error::ClientError;
use crate::types::{LoginRequest, RegisterRequest, TokenResponse};
use agora_core::User;
use reqwest::Method;

impl AgoraClient {
    /// Log in with email and password.
    ///
    /// Returns the access token; the caller decides whether to store it.
    /// Goes through the public pipeline so a stale stored token cannot
    /// interfere with a fresh login attempt.
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, ClientError> {
        let req = self
            .public_request(Method::POST, "/api/v1/auth/login")
            .json(request);
        self.execute(req).await
    }

    /// Create a new account.
    ///
    /// Registration does not log the new account in; the server answers
    /// with the created user only.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ClientError> {
        let req = self
            .public_request(Method::POST, "/api/v1/auth/register")
            .json(request);
        self.execute(req).await
    }

    /// Invalidate the server-side session.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let req = self.request(Method::POST, "/api/v1/auth/logout");
        self.execute_empty_with_retry(req).await
    }

    /// Fetch the profile of the authenticated user.
    pub async fn profile(&self) -> Result<User, ClientError> {
        let req = self.request(Method::GET, "/api/v1/auth/profile");
        self.execute_with_retry(req).await
    }
}
