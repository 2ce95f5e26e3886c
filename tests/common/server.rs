//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own databases.

use super::constants::*;
use super::fixtures::{create_test_accounts, create_test_content};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use unread_posts_server::read_state::ReadStateCookieSettings;
use unread_posts_server::{
    make_app, Hooks, RequestsLoggingLevel, ServerConfig, SqliteAccountStore, SqliteSettingsStore,
};

/// Test server instance with isolated databases
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Account store for direct database access in tests
    pub account_store: Arc<SqliteAccountStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with default hooks
    pub async fn spawn() -> Self {
        Self::spawn_with_hooks(Hooks::default()).await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the databases cannot be created, the port cannot be bound
    /// or the server doesn't become ready within timeout.
    pub async fn spawn_with_hooks(hooks: Hooks) -> Self {
        // Bind first, permalinks need the port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let account_store =
            create_test_accounts(&temp_db_dir).expect("Failed to create test accounts");
        let content_store =
            create_test_content(&temp_db_dir, &base_url).expect("Failed to create test content");
        let settings_store = SqliteSettingsStore::new(temp_db_dir.path().join("settings.db"))
            .expect("Failed to open settings store");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            site_title: SITE_TITLE.to_string(),
            read_state_cookie: ReadStateCookieSettings {
                name: READ_POSTS_COOKIE.to_string(),
                path: "/".to_string(),
                domain: None,
            },
            read_posts_meta_key: READ_POSTS_META_KEY.to_string(),
        };

        let app = make_app(
            config,
            account_store.clone(),
            Arc::new(content_store),
            Arc::new(settings_store),
            hooks,
        )
        .expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            account_store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
