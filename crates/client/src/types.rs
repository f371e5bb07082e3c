//! Request and response types for the Agora API

use agora_core::{Role, VoteDirection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of a successful login or refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateThreadRequest {
    pub category_id: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteResponse {
    pub post_id: String,
    /// Net score after the vote was applied.
    pub score: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Standard `page`/`limit` query parameters for list endpoints.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }
}

/// Query parameters for thread listings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThreadQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Restrict the listing to one category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}
