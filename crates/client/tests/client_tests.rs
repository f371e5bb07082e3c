//! Integration tests for the Agora HTTP client

use agora_client::client::AgoraClient;
use agora_client::error::ClientError;
use agora_client::storage::MemoryTokenStorage;
use agora_client::types::{CreateThreadRequest, PageQuery, ThreadQuery};
use agora_core::VoteDirection;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AgoraClient {
    AgoraClient::builder()
        .base_url(base_url)
        .token_storage(Arc::new(MemoryTokenStorage::new()))
        .build()
        .unwrap()
}

fn user_body(id: &str, username: &str) -> serde_json::Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "role": "user",
        "created_at": "2024-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn test_client_builder() {
    let client = AgoraClient::builder()
        .base_url("http://localhost:8080")
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");
}

#[tokio::test]
async fn test_builder_trims_trailing_slash() {
    let client = AgoraClient::new("http://localhost:8080/").unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = AgoraClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_client_builder_rejects_invalid_url() {
    let result = AgoraClient::builder().base_url("not a url").build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_bearer_token_attached_from_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/profile"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body("u1", "alice")))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    client.tokens().set("tok-1").await.unwrap();

    let user = client.profile().await.unwrap();
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn test_public_requests_carry_no_authorization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-2"})))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    // Even with a stale token in the store, login must not send it.
    client.tokens().set("stale").await.unwrap();

    let response = client
        .login(&agora_client::types::LoginRequest {
            email: "alice@example.com".into(),
            password: "hunter2hunter2".into(),
        })
        .await
        .unwrap();
    assert_eq!(response.access_token, "tok-2");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_error_message_prefers_error_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": "Email already taken", "message": "unused"})),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let err = client
        .register(&agora_client::types::RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "hunter2hunter2".into(),
        })
        .await
        .unwrap_err();

    let normalized = err.normalized();
    assert_eq!(normalized.status, 400);
    assert_eq!(normalized.message, "Email already taken");
}

#[tokio::test]
async fn test_error_detail_list_passes_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/threads"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Validation failed",
            "errors": ["title too short", "content required"]
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let err = client
        .create_thread(&CreateThreadRequest {
            category_id: "c1".into(),
            title: "hi".into(),
            content: "".into(),
        })
        .await
        .unwrap_err();

    match err {
        ClientError::Api(api) => {
            assert_eq!(api.message, "Validation failed");
            assert_eq!(api.errors.as_deref().map(<[String]>::len), Some(2));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_falls_back_to_status_line() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/categories"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let err = client
        .list_categories(&PageQuery::default())
        .await
        .unwrap_err();

    let normalized = err.normalized();
    assert_eq!(normalized.status, 500);
    assert!(normalized.message.contains("500"));
}

#[tokio::test]
async fn test_transport_failure_reports_status_zero() {
    // Nothing listens on port 9; the connection is refused before any
    // HTTP exchange happens.
    let client = test_client("http://127.0.0.1:9");
    let err = client
        .list_categories(&PageQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Request(_)));
    assert_eq!(err.status(), 0);
    assert_eq!(err.normalized().status, 0);
    assert!(!err.normalized().message.is_empty());
}

#[tokio::test]
async fn test_list_threads_sends_pagination_and_filter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/threads"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "10"))
        .and(query_param("category_id", "c7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "t1",
                "category_id": "c7",
                "title": "Welcome",
                "content": "First thread",
                "author": {"id": "u1", "username": "alice"},
                "post_count": 3,
                "created_at": "2024-01-01T00:00:00Z"
            }],
            "meta": {"total_items": 11, "total_pages": 2, "current_page": 2, "limit": 10}
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let page = client
        .list_threads(&ThreadQuery {
            page: Some(2),
            limit: Some(10),
            category_id: Some("c7".into()),
        })
        .await
        .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].title, "Welcome");
    assert_eq!(page.meta.current_page, 2);
    assert!(!page.meta.has_next());
}

#[tokio::test]
async fn test_create_thread_posts_json_body() {
    let mock_server = MockServer::start().await;

    let request = CreateThreadRequest {
        category_id: "c1".into(),
        title: "A proper title".into(),
        content: "Enough content to pass validation".into(),
    };

    Mock::given(method("POST"))
        .and(path("/api/v1/threads"))
        .and(body_json(json!({
            "category_id": "c1",
            "title": "A proper title",
            "content": "Enough content to pass validation"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "t9",
            "category_id": "c1",
            "title": "A proper title",
            "content": "Enough content to pass validation",
            "author": {"id": "u1", "username": "alice"},
            "created_at": "2024-01-02T00:00:00Z"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let thread = client.create_thread(&request).await.unwrap();
    assert_eq!(thread.id, "t9");
    assert_eq!(thread.post_count, 0);
}

#[tokio::test]
async fn test_vote_sends_direction_and_returns_score() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/posts/p3/vote"))
        .and(body_json(json!({"direction": "up"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"post_id": "p3", "score": 4})),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response = client.vote("p3", VoteDirection::Up).await.unwrap();
    assert_eq!(response.post_id, "p3");
    assert_eq!(response.score, 4);
}

#[tokio::test]
async fn test_delete_thread_accepts_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/threads/t1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    assert!(client.delete_thread("t1").await.is_ok());
}

#[tokio::test]
async fn test_admin_role_update() {
    let mock_server = MockServer::start().await;

    let mut moderator = user_body("u2", "bob");
    moderator["role"] = json!("moderator");

    Mock::given(method("PUT"))
        .and(path("/api/v1/users/u2/role"))
        .and(body_json(json!({"role": "moderator"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(moderator))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let user = client
        .set_user_role("u2", agora_core::Role::Moderator)
        .await
        .unwrap();
    assert_eq!(user.role, agora_core::Role::Moderator);
    assert!(user.role.can_moderate());
}
