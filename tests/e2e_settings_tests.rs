//! End-to-end tests for the admin settings endpoints

mod common;

use common::*;
use reqwest::StatusCode;
use serde_json::{json, Value};
use unread_posts_server::Hooks;

#[tokio::test]
async fn test_settings_require_admin() {
    let server = TestServer::spawn().await;
    let anonymous = TestClient::new(server.base_url.clone());
    let user = TestClient::authenticated(server.base_url.clone()).await;

    for client in [&anonymous, &user] {
        assert_eq!(
            client.get_listing_settings().await.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            client.put_listing_settings(json!({"show": true})).await.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            client.get_widget_instance().await.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(client.get_post_types().await.status(), StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_default_listing_settings() {
    let server = TestServer::spawn().await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;

    let response = admin.get_listing_settings().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();

    assert_eq!(
        body,
        json!({
            "show": false,
            "title": "Read Next",
            "count": 5,
            "show_for": ["post"],
            "post_type_mode": "same",
            "post_types": ["post"],
            "orderby": "date",
        })
    );
}

#[tokio::test]
async fn test_listing_settings_are_saved() {
    let server = TestServer::spawn().await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;

    let settings = json!({
        "show": true,
        "title": "Unread",
        "count": 3,
        "show_for": ["post", "page"],
        "post_type_mode": "selected",
        "post_types": ["post"],
        "orderby": "rand",
    });
    let response = admin.put_listing_settings(settings.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = admin.get_listing_settings().await.json().await.unwrap();
    assert_eq!(body, settings);
}

#[tokio::test]
async fn test_invalid_listing_settings_are_rejected() {
    let server = TestServer::spawn().await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;

    let response = admin.put_listing_settings(json!({"count": 0})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = admin
        .put_listing_settings(json!({"post_type_mode": "selected", "post_types": []}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = admin
        .put_listing_settings(json!({"show_for": ["post", "recipe"]}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "Unknown post types: recipe");

    // Nothing was stored
    let body: Value = admin.get_listing_settings().await.json().await.unwrap();
    assert_eq!(body["count"], 5);
    assert_eq!(body["show_for"], json!(["post"]));
}

#[tokio::test]
async fn test_widget_instance_round_trip() {
    let server = TestServer::spawn().await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;

    let body: Value = admin.get_widget_instance().await.json().await.unwrap();
    assert_eq!(body["title"], "");
    assert_eq!(body["post_types"], json!(["post"]));

    let instance = json!({"title": "Catch up", "count": 2, "orderby": "date", "post_types": ["page"]});
    let response = admin.put_widget_instance(instance.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = admin.get_widget_instance().await.json().await.unwrap();
    assert_eq!(body, instance);

    let response = admin.put_widget_instance(json!({"post_types": []})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_usable_post_types() {
    let server = TestServer::spawn().await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;

    let body: Value = admin.get_post_types().await.json().await.unwrap();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();

    assert!(names.contains(&"post"));
    assert!(names.contains(&"page"));
}

#[tokio::test]
async fn test_usable_post_types_hook_limits_choices() {
    let hooks = Hooks::default()
        .with_usable_post_types(|types| types.into_iter().filter(|t| t.name == "post").collect());
    let server = TestServer::spawn_with_hooks(hooks).await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;

    let body: Value = admin.get_post_types().await.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = admin
        .put_widget_instance(json!({"post_types": ["page"]}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_section_settings_hook_overrides_stored_settings() {
    let hooks = Hooks::default().with_section_settings(|mut settings| {
        settings.title = "Forced".to_string();
        settings
    });
    let server = TestServer::spawn_with_hooks(hooks).await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;
    admin.put_listing_settings(json!({"show": true})).await;

    let body: Value = admin.get_listing_settings().await.json().await.unwrap();
    assert_eq!(body["title"], "Forced");

    let html = admin.view_post(POST_3_ID).await.text().await.unwrap();
    assert!(html.contains("<h4>Forced</h4>"));
}

#[tokio::test]
async fn test_settings_page_can_be_disabled() {
    let mut hooks = Hooks::default();
    hooks.show_settings_page = false;
    let server = TestServer::spawn_with_hooks(hooks).await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;

    assert_eq!(
        admin.get_listing_settings().await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(admin.get_post_types().await.status(), StatusCode::NOT_FOUND);
}
