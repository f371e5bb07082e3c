//! Category API client methods

use crate::client::AgoraClient;
use crate::error::ClientError;
use crate::types::{CreateCategoryRequest, PageQuery};
use agora_core::{Category, Page};
use reqwest::Method;

impl AgoraClient {
    /// List categories, newest first.
    pub async fn list_categories(&self, query: &PageQuery) -> Result<Page<Category>, ClientError> {
        let req = self.request(Method::GET, "/api/v1/categories").query(query);
        self.execute_with_retry(req).await
    }

    /// Fetch a single category.
    pub async fn get_category(&self, id: &str) -> Result<Category, ClientError> {
        let req = self.request(Method::GET, &format!("/api/v1/categories/{id}"));
        self.execute_with_retry(req).await
    }

    /// Create a category. Requires a moderator or admin account.
    pub async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<Category, ClientError> {
        let req = self
            .request(Method::POST, "/api/v1/categories")
            .json(request);
        self.execute_with_retry(req).await
    }

    /// Delete a category and everything in it. Admin only.
    pub async fn delete_category(&self, id: &str) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, &format!("/api/v1/categories/{id}"));
        self.execute_empty_with_retry(req).await
    }
}
