//! Test helpers and utilities

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use tokio_accounts::app::build_server_with;
use tokio_accounts::config::Config;
use tokio_accounts::users::Argon2Hasher;
use tokio_accounts::{RunningServer, Server};

/// In-process server plus an HTTP client pointed at it.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    running: RunningServer,
    _db_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Start the full application with default settings.
    pub async fn start() -> Self {
        Self::start_with(Config::default(), |_| {}).await
    }

    /// Start the application, letting the test adjust config and add
    /// middleware or routes before listening.
    pub async fn start_with<F>(mut config: Config, customize: F) -> Self
    where
        F: FnOnce(&mut Server),
    {
        let db_dir = tempfile::tempdir().expect("Failed to create temp dir");
        config.database.path = db_dir
            .path()
            .join("users.db")
            .to_string_lossy()
            .into_owned();

        // Minimum Argon2 cost keeps the suite fast
        let hasher = Arc::new(Argon2Hasher::with_params(8, 1, 1).expect("Argon2 params"));
        let mut server = build_server_with(&config, hasher).expect("Failed to build server");
        customize(&mut server);

        let running = server.listen(0).await.expect("Failed to listen");
        let base_url = format!("http://127.0.0.1:{}", running.local_addr().port());

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            client,
            running,
            _db_dir: db_dir,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.running.local_addr()
    }

    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// Make a POST request with JSON body
    pub async fn post_json<T: serde::Serialize + ?Sized>(&self, path: &str, json: &T) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(json)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Make a POST request with a raw body and content type
    pub async fn post_raw(&self, path: &str, content_type: &str, body: &str) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("content-type", content_type)
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed")
    }

    /// Register a user with valid fields and the given email/password.
    pub async fn register(&self, email: &str, password: &str) -> Response {
        self.post_json("/register", &registration(email, password))
            .await
    }

    /// Stop the server and wait for it to drain.
    pub async fn close(self) {
        self.running.close().await.expect("close failed");
    }
}

/// A valid registration body.
pub fn registration(email: &str, password: &str) -> Value {
    json!({
        "email": email,
        "firstName": "Ada",
        "lastName": "Lovelace",
        "dateOfBirth": "1815-12-10",
        "password": password
    })
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response has header present
pub fn assert_has_header(response: &Response, name: &str) {
    assert!(
        response.headers().contains_key(name),
        "Header '{}' not found",
        name
    );
}

/// Read the body as JSON
pub async fn json_body(response: Response) -> Value {
    response.json().await.expect("Body is not JSON")
}

/// Assert the generic 500 body
pub async fn assert_internal_error(response: Response) {
    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body, json!({"error": "Internal Server Error"}));
}
