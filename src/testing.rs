use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderMap;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::store::{FileStore, LogStore};

/// A test application builder for integration testing.
///
/// Spins up the backend on an ephemeral port with a file store in a fresh
/// temp directory. No MongoDB, no startup probe: the store is injected, so
/// tests run deterministically offline.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login() {
///     let app = TestApp::new().await;
///     let res = app
///         .client
///         .post(&app.url("/api/auth/login"), r#"{"userName":"admin","password":"admin123"}"#)
///         .await;
///     assert_eq!(res.status, 200);
/// }
/// ```
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: TestClient,
    pub config: Config,
    /// Per-test file store. Legacy endpoints always write here; with
    /// [`TestApp::new`] it is also the primary store.
    pub file: Arc<FileStore>,
    _tmp: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test app backed by the file store alone.
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Self::test_config(tmp.path());
        let file = Arc::new(FileStore::new(&config.log_file));
        Self::spawn(config, file.clone(), file, tmp).await
    }

    /// Create a test app with an injected primary store.
    ///
    /// Legacy endpoints keep writing to the per-test file store; everything
    /// else goes through `store`. This is how tests exercise backend failure
    /// without a real database.
    pub async fn with_store(store: Arc<dyn LogStore>) -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Self::test_config(tmp.path());
        let file = Arc::new(FileStore::new(&config.log_file));
        Self::spawn(config, store, file, tmp).await
    }

    async fn spawn(
        config: Config,
        store: Arc<dyn LogStore>,
        file: Arc<FileStore>,
        tmp: tempfile::TempDir,
    ) -> Self {
        let app = crate::App::with_store(config.clone(), store, file.clone());

        let router = app.router();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let client = TestClient::new(addr);

        TestApp {
            addr,
            client,
            config,
            file,
            _tmp: tmp,
        }
    }

    /// Config pointing at a log file under the given directory.
    pub fn test_config(dir: &std::path::Path) -> Config {
        Config {
            mongo_uri: "mongodb://localhost:27017/employee_mgmt".to_string(),
            mongo_db: "employee_mgmt".to_string(),
            log_file: dir.join("login_logs.json").to_string_lossy().into_owned(),
            jwt_secret: "test-secret-key-for-testing".to_string(),
            jwt_expiry_hours: 24,
            server_host: "127.0.0.1".to_string(),
            server_port: 0, // OS assigns a random port
            environment: "test".to_string(),
        }
    }

    /// Get the base URL for the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Login and return the auth token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let body = serde_json::json!({
            "userName": username,
            "password": password,
        });

        let res = self
            .client
            .post(&self.url("/api/auth/login"), &body.to_string())
            .await;

        assert_eq!(res.status, 200, "Login failed: {}", res.body);
        res.json()["token"].as_str().unwrap().to_string()
    }
}

/// A simple HTTP test client with helper methods.
#[derive(Clone)]
pub struct TestClient {
    inner: reqwest::Client,
    base_addr: SocketAddr,
}

impl TestClient {
    /// Create a new test client pointing at the given address.
    pub fn new(addr: SocketAddr) -> Self {
        TestClient {
            inner: reqwest::Client::new(),
            base_addr: addr,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .get(url)
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, url: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut req = self.inner.get(url);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let res = req.send().await.expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request with an auth token.
    pub async fn get_with_auth(&self, url: &str, token: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&self, url: &str, body: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with extra headers.
    pub async fn post_with_headers(
        &self,
        url: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut req = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string());
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let res = req.send().await.expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Get the base URL.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.base_addr)
    }
}

/// A simplified HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub body: String,
    pub headers: HeaderMap,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = HeaderMap::new();
        let body = res.text().await.unwrap_or_default();
        TestResponse {
            status,
            body,
            headers,
        }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Failed to parse response as JSON")
    }

    /// Get the message from an `{"error": ...}` body.
    pub fn error(&self) -> String {
        self.json()["error"].as_str().unwrap_or_default().to_string()
    }
}
