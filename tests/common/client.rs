//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and provides one method per server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Response;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// HTTP test client with its own cookie jar, like a browser
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// Cookies received so far
    pub cookies: Arc<Jar>,
}

impl TestClient {
    /// Creates a new anonymous client
    pub fn new(base_url: String) -> Self {
        let cookies = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            cookies,
        }
    }

    /// Creates a client logged in as the regular test account
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        let client = Self::new(base_url);

        let response = client.login(TEST_USER, TEST_PASS).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Test user authentication failed: {:?}",
            response.text().await
        );

        client
    }

    /// Creates a client logged in as the admin test account
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated_admin(base_url: String) -> Self {
        let client = Self::new(base_url);

        let response = client.login(ADMIN_USER, ADMIN_PASS).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Admin authentication failed: {:?}",
            response.text().await
        );

        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Value of the cookie `name` as it would be sent to the server.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let url = self.base_url.parse().expect("Invalid base url");
        let header = self.cookies.cookies(&url)?;
        let prefix = format!("{}=", name);
        header
            .to_str()
            .ok()?
            .split("; ")
            .find(|c| c.starts_with(&prefix))
            .map(|c| c[prefix.len()..].to_string())
    }

    /// Stores a cookie as if the server had set it.
    pub fn set_cookie(&self, name: &str, value: &str) {
        let url = self.base_url.parse().expect("Invalid base url");
        self.cookies
            .add_cookie_str(&format!("{}={}; Path=/", name, value), &url);
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /v1/auth/login
    pub async fn login(&self, handle: &str, password: &str) -> Response {
        self.client
            .post(self.url("/v1/auth/login"))
            .json(&json!({
                "user_handle": handle,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// GET /v1/auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .get(self.url("/v1/auth/logout"))
            .send()
            .await
            .expect("Logout request failed")
    }

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Pages
    // ========================================================================

    /// GET /posts/{id}
    pub async fn view_post(&self, id: u64) -> Response {
        self.client
            .get(self.url(&format!("/posts/{}", id)))
            .send()
            .await
            .expect("Post page request failed")
    }

    /// GET /v1/widget
    pub async fn get_widget(&self) -> Response {
        self.client
            .get(self.url("/v1/widget"))
            .send()
            .await
            .expect("Widget request failed")
    }

    // ========================================================================
    // Read State Endpoints
    // ========================================================================

    /// GET /v1/read
    pub async fn get_read(&self) -> Response {
        self.client
            .get(self.url("/v1/read"))
            .send()
            .await
            .expect("Get read request failed")
    }

    /// Read ids from GET /v1/read
    pub async fn read_ids(&self) -> Vec<u64> {
        let body: Value = self
            .get_read()
            .await
            .json()
            .await
            .expect("Invalid read state body");
        body["read_post_ids"]
            .as_array()
            .expect("Missing read_post_ids")
            .iter()
            .map(|id| id.as_u64().expect("Invalid post id"))
            .collect()
    }

    /// POST /v1/read with a raw `post_ids` value, either one id or a list
    pub async fn mark_read_raw(&self, post_ids: Value) -> Response {
        self.client
            .post(self.url("/v1/read"))
            .json(&json!({ "post_ids": post_ids }))
            .send()
            .await
            .expect("Mark read request failed")
    }

    /// POST /v1/read with a single id
    pub async fn mark_read(&self, id: u64) -> Response {
        self.mark_read_raw(json!(id)).await
    }

    /// POST /v1/read with many ids
    pub async fn mark_many_read(&self, ids: &[u64]) -> Response {
        self.mark_read_raw(json!(ids)).await
    }

    /// DELETE /v1/read
    pub async fn mark_unread(&self, ids: &[u64]) -> Response {
        self.client
            .delete(self.url("/v1/read"))
            .json(&json!({ "post_ids": ids }))
            .send()
            .await
            .expect("Mark unread request failed")
    }

    /// DELETE /v1/read/all
    pub async fn delete_read_state(&self) -> Response {
        self.client
            .delete(self.url("/v1/read/all"))
            .send()
            .await
            .expect("Delete read state request failed")
    }

    // ========================================================================
    // Listing Endpoints
    // ========================================================================

    /// GET /v1/unread with the given query string (without '?')
    pub async fn get_unread(&self, query: &str) -> Response {
        let path = if query.is_empty() {
            "/v1/unread".to_string()
        } else {
            format!("/v1/unread?{}", query)
        };
        self.client
            .get(self.url(&path))
            .send()
            .await
            .expect("Unread request failed")
    }

    /// Ids listed by GET /v1/unread, in order, plus the `found` total
    pub async fn unread_ids(&self, query: &str) -> (u64, Vec<u64>) {
        let body: Value = self
            .get_unread(query)
            .await
            .json()
            .await
            .expect("Invalid unread body");
        let ids = body["items"]
            .as_array()
            .expect("Missing items")
            .iter()
            .map(|item| item["id"].as_u64().expect("Invalid post id"))
            .collect();
        (body["found"].as_u64().expect("Missing found"), ids)
    }

    // ========================================================================
    // Admin Endpoints
    // ========================================================================

    /// GET /v1/admin/settings
    pub async fn get_listing_settings(&self) -> Response {
        self.client
            .get(self.url("/v1/admin/settings"))
            .send()
            .await
            .expect("Get settings request failed")
    }

    /// PUT /v1/admin/settings
    pub async fn put_listing_settings(&self, settings: Value) -> Response {
        self.client
            .put(self.url("/v1/admin/settings"))
            .json(&settings)
            .send()
            .await
            .expect("Put settings request failed")
    }

    /// GET /v1/admin/widget
    pub async fn get_widget_instance(&self) -> Response {
        self.client
            .get(self.url("/v1/admin/widget"))
            .send()
            .await
            .expect("Get widget request failed")
    }

    /// PUT /v1/admin/widget
    pub async fn put_widget_instance(&self, instance: Value) -> Response {
        self.client
            .put(self.url("/v1/admin/widget"))
            .json(&instance)
            .send()
            .await
            .expect("Put widget request failed")
    }

    /// GET /v1/admin/post-types
    pub async fn get_post_types(&self) -> Response {
        self.client
            .get(self.url("/v1/admin/post-types"))
            .send()
            .await
            .expect("Post types request failed")
    }
}
