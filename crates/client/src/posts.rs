//! Post and voting API client methods

use crate::client::AgoraClient;
use crate::error::ClientError;
use crate::types::{CreatePostRequest, PageQuery, VoteRequest, VoteResponse};
use agora_core::{Page, Post, VoteDirection};
use reqwest::Method;

impl AgoraClient {
    /// List the posts of a thread in creation order.
    pub async fn list_posts(
        &self,
        thread_id: &str,
        query: &PageQuery,
    ) -> Result<Page<Post>, ClientError> {
        let req = self
            .request(Method::GET, &format!("/api/v1/threads/{thread_id}/posts"))
            .query(query);
        self.execute_with_retry(req).await
    }

    /// Reply to a thread.
    pub async fn create_post(
        &self,
        thread_id: &str,
        request: &CreatePostRequest,
    ) -> Result<Post, ClientError> {
        let req = self
            .request(Method::POST, &format!("/api/v1/threads/{thread_id}/posts"))
            .json(request);
        self.execute_with_retry(req).await
    }

    /// Delete a post. Authors may delete their own; moderators any.
    pub async fn delete_post(&self, id: &str) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, &format!("/api/v1/posts/{id}"));
        self.execute_empty_with_retry(req).await
    }

    /// Vote on a post. Voting again in the same direction is idempotent;
    /// the opposite direction replaces the earlier vote.
    pub async fn vote(
        &self,
        post_id: &str,
        direction: VoteDirection,
    ) -> Result<VoteResponse, ClientError> {
        let req = self
            .request(Method::POST, &format!("/api/v1/posts/{post_id}/vote"))
            .json(&VoteRequest { direction });
        self.execute_with_retry(req).await
    }
}
