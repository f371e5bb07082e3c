//! Typed HTTP client for the Agora forum API
//!
//! The crate revolves around [`AgoraClient`]: one instance per server,
//! cheap to clone, safe to share across tasks. Authenticated calls attach
//! the bearer token held by the client's [`TokenStore`] and transparently
//! recover from an expired token by refreshing and retrying once.

pub mod auth;
pub mod categories;
pub mod client;
pub mod config;
pub mod error;
pub mod posts;
pub mod retry;
pub mod storage;
pub mod threads;
pub mod token;
pub mod types;
pub mod users;

pub use client::{AgoraClient, AgoraClientBuilder};
pub use config::ClientConfig;
pub use error::{ApiError, ClientError};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use token::TokenStore;
