// HTTP API tests
// Run with: cargo test -p pupillix-control-plane --test api_test
// Drives the full router in-process against in-memory storage.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use pupillix_control_plane::auth::AuthConfig;
use pupillix_control_plane::build_app;
use pupillix_control_plane::config::ServerConfig;
use pupillix_control_plane::storage::{Argon2Params, StorageBackend, UpdateUser};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const DOWNLOAD_URL: &str = "https://downloads.test/pupillix.zip";

struct TestApp {
    app: Router,
    db: Arc<StorageBackend>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_prefix("")
    }

    fn with_prefix(prefix: &str) -> Self {
        let config = ServerConfig {
            api_prefix: prefix.to_string(),
            download_url: DOWNLOAD_URL.to_string(),
            ..Default::default()
        };
        let auth_config = AuthConfig {
            argon2: Argon2Params::insecure_fast(),
            ..Default::default()
        };
        let db = Arc::new(StorageBackend::in_memory());
        let app = build_app(&config, auth_config, db.clone());
        Self { app, db }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn signup(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.call(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Register and return (user id, token)
    async fn register(&self, name: &str, email: &str) -> (Uuid, String) {
        let (status, body) = self.signup(name, email, "secret1").await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
        (id, body["token"].as_str().unwrap().to_string())
    }

    async fn deactivate(&self, id: Uuid) {
        self.db
            .update_user(
                id,
                UpdateUser {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
    }
}

#[tokio::test]
async fn test_ann_scenario() {
    let app = TestApp::new();

    // Register
    let (status, body) = app.signup("Ann", "ann@x.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["expiresIn"], 604800);
    assert_eq!(body["user"]["name"], "Ann");
    let ann_id = body["user"]["id"].clone();

    // Login resolves to the same principal
    let (status, body) = app.login("ann@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], ann_id);
    let token = body["token"].as_str().unwrap().to_string();

    // Verify
    let (status, body) = app.call("POST", "/api/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], ann_id);
    assert_eq!(body["user"]["email"], "ann@x.com");

    // Track with no body: default version
    let (status, body) = app
        .call("POST", "/api/download/track", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalDownloads"], 1);
    assert_eq!(body["downloadUrl"], DOWNLOAD_URL);
    assert!(body["lastDownload"].is_string());

    let (status, body) = app
        .call(
            "POST",
            "/api/download/track",
            Some(&token),
            Some(json!({ "version": "1.0.1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalDownloads"], 2);

    // History newest first
    let (status, body) = app
        .call("GET", "/api/user/download-history", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalDownloads"], 2);
    let versions: Vec<&str> = body["downloads"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["version"].as_str().unwrap())
        .collect();
    assert_eq!(versions, vec!["1.0.1", "1.0.0"]);

    // Profile
    let (status, body) = app
        .call("GET", "/api/user/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], ann_id);
    assert_eq!(body["stats"]["totalDownloads"], 2);
    assert!(body["stats"]["lastDownload"].is_string());
    assert_eq!(body["stats"]["memberSince"], body["registeredAt"]);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new();
    let (_, token) = app.register("Ann", "ann@x.com").await;

    let (status, body) = app.signup("Ann Again", "ann@x.com", "secret2").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "email_conflict");

    // Normalization makes case variants collide
    let (status, _) = app.signup("Ann", "  ANN@X.COM ", "secret1").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.call("GET", "/api/user/all", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_login_with_normalized_email() {
    let app = TestApp::new();
    let (id, _) = app.register("Ann", "ann@x.com").await;

    let (status, body) = app.login(" Ann@X.com ", "secret1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id.to_string());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_are_identical() {
    let app = TestApp::new();
    app.register("Ann", "ann@x.com").await;

    let (wrong_status, wrong_body) = app.login("ann@x.com", "not-it").await;
    let (unknown_status, unknown_body) = app.login("nobody@x.com", "secret1").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid credentials");
    assert_eq!(wrong_body["code"], "invalid_credentials");
}

#[tokio::test]
async fn test_signup_validation_details() {
    let app = TestApp::new();

    let (status, body) = app.signup("A", "not-an-email", "123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "email", "password"]);

    // Nothing was created
    let (_, token) = app.register("Bob", "bob@x.com").await;
    let (_, body) = app.call("GET", "/api/user/all", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    // Missing content type on login
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_auth_gate_rejections() {
    let app = TestApp::new();

    let (status, body) = app.call("GET", "/api/user/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");
    assert_eq!(body["code"], "authentication_required");

    let (status, body) = app
        .call("GET", "/api/user/profile", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired session");
    assert_eq!(body["code"], "invalid_session");

    // Other schemes count as no credentials
    let request = Request::builder()
        .method("GET")
        .uri("/api/user/profile")
        .header(header::AUTHORIZATION, "Basic YW5uOnNlY3JldA==")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "authentication_required");

    // Every protected route is gated
    for (method, uri) in [
        ("POST", "/api/auth/verify"),
        ("POST", "/api/download/track"),
        ("GET", "/api/download/stats"),
        ("GET", "/api/user/download-history"),
        ("GET", "/api/user/all"),
    ] {
        let (status, _) = app.call(method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_token_from_other_key_rejected() {
    let app = TestApp::new();
    let other = TestApp::new();
    let (_, foreign_token) = other.register("Ann", "ann@x.com").await;

    let (status, body) = app
        .call("POST", "/api/auth/verify", Some(&foreign_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_session");
}

#[tokio::test]
async fn test_deactivated_user_is_locked_out() {
    let app = TestApp::new();
    let (id, token) = app.register("Ann", "ann@x.com").await;
    app.deactivate(id).await;

    let (status, body) = app
        .call("POST", "/api/download/track", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Account is inactive");
    assert_eq!(body["code"], "account_inactive");

    let (status, _) = app.call("POST", "/api/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Correct password reveals the inactive state, a wrong one does not
    let (status, body) = app.login("ann@x.com", "secret1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "account_inactive");

    let (status, body) = app.login("ann@x.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_credentials");
}

#[tokio::test]
async fn test_track_records_request_metadata() {
    let app = TestApp::new();
    let (_, token) = app.register("Ann", "ann@x.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/download/track")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .header(header::USER_AGENT, "PupillixInstaller/2.1")
        .body(Body::from(r#"{"version":"2.0.0"}"#))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);

    // No proxy header and no socket peer in-process
    let (status, _) = app
        .call("POST", "/api/download/track", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .call("GET", "/api/user/download-history", Some(&token), None)
        .await;
    let downloads = body["downloads"].as_array().unwrap();
    assert_eq!(downloads.len(), 2);
    assert_eq!(downloads[0]["version"], "1.0.0");
    assert_eq!(downloads[0]["ipAddress"], "unknown");
    assert_eq!(downloads[0]["userAgent"], "unknown");
    assert_eq!(downloads[1]["version"], "2.0.0");
    assert_eq!(downloads[1]["ipAddress"], "203.0.113.7");
    assert_eq!(downloads[1]["userAgent"], "PupillixInstaller/2.1");
}

#[tokio::test]
async fn test_track_rejects_bad_version() {
    let app = TestApp::new();
    let (_, token) = app.register("Ann", "ann@x.com").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/download/track",
            Some(&token),
            Some(json!({ "version": "x".repeat(65) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "version");

    // Nothing recorded
    let (_, body) = app
        .call("GET", "/api/user/profile", Some(&token), None)
        .await;
    assert_eq!(body["stats"]["totalDownloads"], 0);
}

#[tokio::test]
async fn test_global_stats() {
    let app = TestApp::new();
    let (_, ann) = app.register("Ann", "ann@x.com").await;
    let (bob_id, bob) = app.register("Bob", "bob@x.com").await;
    app.register("Cid", "cid@x.com").await;

    for _ in 0..2 {
        app.call("POST", "/api/download/track", Some(&ann), None)
            .await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    app.call("POST", "/api/download/track", Some(&bob), None)
        .await;

    let (status, body) = app
        .call("GET", "/api/download/stats", Some(&ann), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalUsers"], 3);
    assert_eq!(body["totalDownloads"], 3);

    let recent = body["recentDownloads"].as_array().unwrap();
    // Cid never downloaded
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["id"], bob_id.to_string());
    assert_eq!(recent[1]["totalDownloads"], 2);
    assert!(recent[0].get("password").is_none());
}

#[tokio::test]
async fn test_list_all_users() {
    let app = TestApp::new();
    let (ann_id, token) = app.register("Ann", "ann@x.com").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (bob_id, _) = app.register("Bob", "bob@x.com").await;

    let (status, body) = app.call("GET", "/api/user/all", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["id"], bob_id.to_string());
    assert_eq!(users[1]["id"], ann_id.to_string());
    for user in users {
        assert!(user.get("password").is_none());
        assert!(user.get("passwordHash").is_none());
        assert!(user["registeredAt"].is_string());
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.call("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert!(body["uptimeSeconds"].is_u64());
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = TestApp::new();
    let (status, body) = app.call("GET", "/api-doc/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/auth/signup"].is_object());
    assert!(body["paths"]["/api/download/track"].is_object());
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let app = TestApp::new();

    let (status, body) = app.call("GET", "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_bearer_scheme_is_case_insensitive() {
    let app = TestApp::new();
    let (id, token) = app.register("Ann", "ann@x.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/verify")
        .header(header::AUTHORIZATION, format!("bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id.to_string());
}

#[tokio::test]
async fn test_api_prefix() {
    let app = TestApp::with_prefix("/v2");

    let (status, _) = app.call("GET", "/v2/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}
