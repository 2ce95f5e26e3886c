//! End-to-end tests for authentication endpoints
//!
//! Tests login, logout, and how the session picks the read state backend.

mod common;

use common::{TestClient, TestServer, ADMIN_PASS, ADMIN_USER, TEST_PASS, TEST_USER};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_USER, TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());
    assert_eq!(client.cookie("session_token").as_deref(), Some(token));
}

#[tokio::test]
async fn test_login_with_invalid_password() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_USER, "wrong_password").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(client.cookie("session_token").is_none());
}

#[tokio::test]
async fn test_login_with_nonexistent_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login("nonexistent_user", "password").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_home_reports_authentication() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.home().await.json().await.unwrap();
    assert_eq!(body["authenticated"], false);

    client.login(ADMIN_USER, ADMIN_PASS).await;
    let body: Value = client.home().await.json().await.unwrap();
    assert_eq!(body["authenticated"], true);
    assert!(body["uptime"].as_str().is_some());
}

#[tokio::test]
async fn test_session_selects_persistent_backend() {
    let server = TestServer::spawn().await;
    let anonymous = TestClient::new(server.base_url.clone());
    let authenticated = TestClient::authenticated(server.base_url.clone()).await;

    let body: Value = anonymous.get_read().await.json().await.unwrap();
    assert_eq!(body["backend"], "cookie");

    let body: Value = authenticated.get_read().await.json().await.unwrap();
    assert_eq!(body["backend"], "persistent");
    assert!(body["account_id"].as_u64().is_some());
}

#[tokio::test]
async fn test_token_in_authorization_header() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let body: Value = client
        .login(TEST_USER, TEST_PASS)
        .await
        .json()
        .await
        .unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    // A fresh client without the session cookie
    let other = TestClient::new(server.base_url.clone());
    let response = other
        .client
        .get(format!("{}/v1/read", server.base_url))
        .header("Authorization", token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["backend"], "persistent");
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(client.cookie("session_token").is_none());

    let body: Value = client.get_read().await.json().await.unwrap();
    assert_eq!(body["backend"], "cookie");

    // Already logged out
    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_token_falls_back_to_cookie_backend() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    client.set_cookie("session_token", "not-a-real-token");

    let response = client.get_read().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["backend"], "cookie");
}
