//! Thread API client methods

use crate::client::AgoraClient;
use crate::error::ClientError;
use crate::types::{CreateThreadRequest, ThreadQuery};
use agora_core::{Page, Thread};
use reqwest::Method;

impl AgoraClient {
    /// List threads, optionally filtered to one category.
    pub async fn list_threads(&self, query: &ThreadQuery) -> Result<Page<Thread>, ClientError> {
        let req = self.request(Method::GET, "/api/v1/threads").query(query);
        self.execute_with_retry(req).await
    }

    /// Fetch a single thread.
    pub async fn get_thread(&self, id: &str) -> Result<Thread, ClientError> {
        let req = self.request(Method::GET, &format!("/api/v1/threads/{id}"));
        self.execute_with_retry(req).await
    }

    /// Start a new thread.
    pub async fn create_thread(&self, request: &CreateThreadRequest) -> Result<Thread, ClientError> {
        let req = self.request(Method::POST, "/api/v1/threads").json(request);
        self.execute_with_retry(req).await
    }

    /// Delete a thread. Authors may delete their own; moderators any.
    pub async fn delete_thread(&self, id: &str) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, &format!("/api/v1/threads/{id}"));
        self.execute_empty_with_retry(req).await
    }
}
