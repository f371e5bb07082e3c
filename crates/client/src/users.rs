//! User administration API client methods
//!
//! All of these require an admin account; the server answers 403 for
//! anyone else.

use crate::client::AgoraClient;
use crate::error::ClientError;
use crate::types::{PageQuery, UpdateRoleRequest};
use agora_core::{Page, Role, User};
use reqwest::Method;

impl AgoraClient {
    /// List registered users.
    pub async fn list_users(&self, query: &PageQuery) -> Result<Page<User>, ClientError> {
        let req = self.request(Method::GET, "/api/v1/users").query(query);
        self.execute_with_retry(req).await
    }

    /// Change a user's role.
    pub async fn set_user_role(&self, id: &str, role: Role) -> Result<User, ClientError> {
        let req = self
            .request(Method::PUT, &format!("/api/v1/users/{id}/role"))
            .json(&UpdateRoleRequest { role });
        self.execute_with_retry(req).await
    }

    /// Delete a user account and its content.
    pub async fn delete_user(&self, id: &str) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, &format!("/api/v1/users/{id}"));
        self.execute_empty_with_retry(req).await
    }
}
