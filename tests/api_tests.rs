use std::sync::Arc;

use ems_backend::models::{Browser, DeviceType, LoginAttempt, Os};
use ems_backend::store::{LogPage, LogQuery, LogStore, StoreError};
use ems_backend::TestApp;

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

/// A store whose writes always fail, standing in for a dead backend.
struct FailingStore;

#[async_trait::async_trait]
impl LogStore for FailingStore {
    async fn append(&self, _record: &LoginAttempt) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }

    async fn query(&self, _query: &LogQuery) -> Result<LogPage, StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "userName": "admin",
        "password": "admin123"
    });

    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 200);
    let json = res.json();
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["role"], "CEO");
    assert_eq!(json["userId"], "1");
    assert_eq!(json["forcePasswordChange"], false);
    assert!(json["token"].as_str().unwrap().contains('.'));

    // The attempt is on the audit trail
    let logs = app.file.snapshot().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].username.as_deref(), Some("admin"));
    assert!(logs[0].success);
    assert_eq!(logs[0].note, "Login successful");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "userName": "admin",
        "password": "wrong_password"
    });

    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.error(), "Invalid credentials");

    // Failed attempts are logged too
    let logs = app.file.snapshot().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert!(!logs[0].success);
    assert_eq!(logs[0].note, "Invalid credentials");
}

#[tokio::test]
async fn test_login_unknown_user_is_logged() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "userName": "ghost",
        "password": "boo"
    });

    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.error(), "Invalid credentials");

    let logs = app.file.snapshot().await.unwrap();
    assert_eq!(logs[0].username.as_deref(), Some("ghost"));
    assert!(!logs[0].success);
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = TestApp::new().await;

    for body in [
        serde_json::json!({ "userName": "admin" }).to_string(),
        serde_json::json!({ "password": "admin123" }).to_string(),
        serde_json::json!({ "userName": "admin", "password": "" }).to_string(),
        serde_json::json!({}).to_string(),
        "this is not json".to_string(),
        String::new(),
    ] {
        let res = app.client.post(&app.url("/api/auth/login"), &body).await;
        assert_eq!(res.status, 400, "body: {:?}", body);
        assert_eq!(res.error(), "Username and password required");
    }

    // Rejected requests never reach the log
    assert!(app.file.snapshot().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_records_client_metadata() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "userName": "john.doe",
        "password": "password123",
        "clientIp": "10.0.0.99"
    });

    let res = app
        .client
        .post_with_headers(
            &app.url("/api/auth/login"),
            &body.to_string(),
            &[
                ("X-Forwarded-For", "203.0.113.9, 70.1.1.1"),
                ("User-Agent", IPHONE_UA),
            ],
        )
        .await;
    assert_eq!(res.status, 200);

    let logs = app.file.snapshot().await.unwrap();
    let record = &logs[0];
    assert_eq!(record.server_ip, "203.0.113.9");
    assert_eq!(record.client_ip.as_deref(), Some("10.0.0.99"));
    assert_eq!(record.user_agent.as_deref(), Some(IPHONE_UA));
    assert_eq!(record.device_type, DeviceType::Mobile);
    assert_eq!(record.browser, Browser::Safari);
    // "mac" matches before "ios" in the OS rules
    assert_eq!(record.os, Os::MacOs);
}

#[tokio::test]
async fn test_login_is_refused_when_the_attempt_cannot_be_recorded() {
    let app = TestApp::with_store(Arc::new(FailingStore)).await;

    let body = serde_json::json!({
        "userName": "admin",
        "password": "admin123"
    });
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    // Valid credentials, but no token for an attempt the log never saw.
    assert_eq!(res.status, 500);
    assert!(res.error().starts_with("Storage error"));
    assert!(res.json()["token"].is_null());
    assert!(app.file.snapshot().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_logs_require_a_token() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/api/login-logs/logs")).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error(), "No token provided");
}

#[tokio::test]
async fn test_logs_reject_a_garbage_token() {
    let app = TestApp::new().await;

    let res = app
        .client
        .get_with_auth(&app.url("/api/login-logs/logs"), "not.a.token")
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error(), "Invalid token");
}

#[tokio::test]
async fn test_logs_reject_an_expired_token() {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let app = TestApp::new().await;

    let claims = ems_backend::auth::Claims {
        user_id: "1".to_string(),
        username: "admin".to_string(),
        role: "CEO".to_string(),
        exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(app.config.jwt_secret.as_bytes()),
    )
    .unwrap();

    let res = app
        .client
        .get_with_auth(&app.url("/api/login-logs/logs"), &token)
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error(), "Token expired");
}

#[tokio::test]
async fn test_logs_accept_a_bare_token_without_bearer_prefix() {
    let app = TestApp::new().await;
    let token = app.login("admin", "admin123").await;

    let res = app
        .client
        .get_with_headers(
            &app.url("/api/login-logs/logs"),
            &[("Authorization", token.as_str())],
        )
        .await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn test_logs_envelope_and_pagination() {
    let app = TestApp::new().await;
    let token = app.login("admin", "admin123").await;

    // Two more attempts on top of the login above
    let ok = serde_json::json!({ "userName": "john.doe", "password": "password123" });
    app.client
        .post(&app.url("/api/auth/login"), &ok.to_string())
        .await;
    let bad = serde_json::json!({ "userName": "admin", "password": "nope" });
    app.client
        .post(&app.url("/api/auth/login"), &bad.to_string())
        .await;

    let res = app
        .client
        .get_with_auth(&app.url("/api/login-logs/logs?page=1&limit=2"), &token)
        .await;
    assert_eq!(res.status, 200);
    let json = res.json();
    assert_eq!(json["total"], 3);
    assert_eq!(json["page"], 1);
    assert_eq!(json["totalPages"], 2);
    let logs = json["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    // Newest first: the failed attempt came last
    assert_eq!(logs[0]["note"], "Invalid credentials");
    assert_eq!(logs[1]["username"], "john.doe");

    let res = app
        .client
        .get_with_auth(&app.url("/api/login-logs/logs?page=2&limit=2"), &token)
        .await;
    let json = res.json();
    assert_eq!(json["logs"].as_array().unwrap().len(), 1);
    assert_eq!(json["page"], 2);

    // Defaults: page 1, limit 50
    let res = app
        .client
        .get_with_auth(&app.url("/api/login-logs/logs"), &token)
        .await;
    let json = res.json();
    assert_eq!(json["logs"].as_array().unwrap().len(), 3);
    assert_eq!(json["totalPages"], 1);
}

#[tokio::test]
async fn test_logs_filter_by_username_substring() {
    let app = TestApp::new().await;
    let token = app.login("admin", "admin123").await;

    let body = serde_json::json!({ "userName": "john.doe", "password": "password123" });
    app.client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    let res = app
        .client
        .get_with_auth(&app.url("/api/login-logs/logs?username=OHN"), &token)
        .await;
    let json = res.json();
    assert_eq!(json["total"], 1);
    assert_eq!(json["logs"][0]["username"], "john.doe");

    let res = app
        .client
        .get_with_auth(&app.url("/api/login-logs/logs?username=zzz"), &token)
        .await;
    let json = res.json();
    assert_eq!(json["total"], 0);
    assert_eq!(json["totalPages"], 0);
    assert!(json["logs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_logs_clamp_page_and_limit() {
    let app = TestApp::new().await;
    let token = app.login("admin", "admin123").await;
    app.login("john.doe", "password123").await;

    let res = app
        .client
        .get_with_auth(&app.url("/api/login-logs/logs?page=0&limit=0"), &token)
        .await;
    assert_eq!(res.status, 200);
    let json = res.json();
    assert_eq!(json["page"], 1);
    assert_eq!(json["logs"].as_array().unwrap().len(), 1);
    assert_eq!(json["totalPages"], 2);

    let res = app
        .client
        .get_with_auth(&app.url("/api/login-logs/logs?page=-3&limit=-1"), &token)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["page"], 1);

    // The largest values the query string can carry read as past the end.
    let res = app
        .client
        .get_with_auth(
            &app.url(&format!(
                "/api/login-logs/logs?page={max}&limit={max}",
                max = i64::MAX
            )),
            &token,
        )
        .await;
    assert_eq!(res.status, 200);
    let json = res.json();
    assert_eq!(json["total"], 2);
    assert!(json["logs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_legacy_append_and_list() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "username": "legacy.user",
        "ip": "10.0.0.7",
        "userAgent": "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
    });

    let res = app
        .client
        .post(&app.url("/api/login"), &body.to_string())
        .await;
    assert_eq!(res.status, 201);
    let json = res.json();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["saved"]["username"], "legacy.user");
    assert_eq!(json["saved"]["note"], "stored_on_server");
    assert_eq!(json["saved"]["clientIp"], "10.0.0.7");
    assert_eq!(json["saved"]["deviceType"], "desktop");
    assert_eq!(json["saved"]["browser"], "Chrome");
    assert_eq!(json["saved"]["os"], "Windows");
    assert_eq!(json["saved"]["success"], true);

    let res = app.client.get(&app.url("/api/logs")).await;
    assert_eq!(res.status, 200);
    let list = res.json();
    let array = list.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["username"], "legacy.user");
}

#[tokio::test]
async fn test_legacy_append_tolerates_an_empty_body() {
    let app = TestApp::new().await;

    let res = app.client.post(&app.url("/api/login"), "").await;
    assert_eq!(res.status, 201);
    let json = res.json();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["saved"]["username"], serde_json::Value::Null);
    assert_eq!(json["saved"]["note"], "stored_on_server");
    assert_eq!(json["saved"]["deviceType"], "unknown");
    assert_eq!(json["saved"]["browser"], "Unknown");

    let logs = app.file.snapshot().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].username.is_none());
}

#[tokio::test]
async fn test_legacy_list_is_newest_first() {
    let app = TestApp::new().await;

    let later = serde_json::json!({
        "username": "later",
        "timestamp": "2025-03-14T10:00:00"
    });
    let earlier = serde_json::json!({
        "username": "earlier",
        "timestamp": "2025-03-14T09:00:00"
    });

    // Inserted out of order on purpose
    app.client
        .post(&app.url("/api/login"), &later.to_string())
        .await;
    app.client
        .post(&app.url("/api/login"), &earlier.to_string())
        .await;

    let res = app.client.get(&app.url("/api/logs")).await;
    let list = res.json();
    let array = list.as_array().unwrap();
    assert_eq!(array[0]["username"], "later");
    assert_eq!(array[0]["timestamp"], "2025-03-14T10:00:00.000000Z");
    assert_eq!(array[1]["username"], "earlier");
}

#[tokio::test]
async fn test_health_reports_the_storage_backend() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/health")).await;
    assert_eq!(res.status, 200);
    let json = res.json();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["storage"], "file");
}

#[tokio::test]
async fn test_welcome_page() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/")).await;
    assert_eq!(res.status, 200);
    let json = res.json();
    assert_eq!(json["message"], "Employee Management System backend");
    assert_eq!(json["docs"], "/api-docs");
}

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/api-docs/openapi.json")).await;
    assert_eq!(res.status, 200);
    let json = res.json();
    assert_eq!(json["info"]["title"], "EMS Backend API");
    assert!(json["paths"]["/api/auth/login"].is_object());
    assert!(json["paths"]["/api/login-logs/logs"].is_object());
    assert!(json["paths"]["/api/login"].is_object());
}
