//! HTTP-level tests: login, bearer gate and CRUD round-trips over `/users`

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use crudkit::prelude::*;
use serde_json::{Value, json};

const SECRET: &str = "integration-secret";

struct TestApp {
    server: TestServer,
}

impl TestApp {
    /// Server with one seeded user (alice@example.com / secret123)
    async fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.secret = SECRET.to_string();
        config.auth.bcrypt_cost = 4;
        config.middleware.logging = false;

        let users: Arc<dyn RecordStore<User>> = Arc::new(InMemoryStore::new());
        let seed = ResourceController::new(users.clone(), SecretHasher::new(4));
        seed.create(&object(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "secret123"
        })))
        .await
        .unwrap();

        let router = ServerBuilder::new(config)
            .register_resource::<User>(users.clone())
            .with_login::<User>(users)
            .unwrap()
            .build()
            .unwrap();

        Self {
            server: TestServer::new(router),
        }
    }

    async fn login(&self) -> String {
        let response = self
            .server
            .post("/login")
            .json(&json!({"email": "alice@example.com", "password": "secret123"}))
            .await;
        response.assert_status(StatusCode::OK);
        response.json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

fn object(value: Value) -> Representation {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => unreachable!(),
    }
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

fn bob() -> Value {
    json!({
        "username": "bobby",
        "email": "bob@example.com",
        "password": "hunter22"
    })
}

// ==============================================================
// Public routes
// ==============================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;

    let response = app.server.get("/health").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ok");

    app.server.get("/healthz").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_login_returns_bearer_token() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/login")
        .json(&json!({"email": "alice@example.com", "password": "secret123"}))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;

    let wrong_password = app
        .server
        .post("/login")
        .json(&json!({"email": "alice@example.com", "password": "nope-nope"}))
        .await;
    let unknown_user = app
        .server
        .post("/login")
        .json(&json!({"email": "nobody@example.com", "password": "secret123"}))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_user.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.json::<Value>(), unknown_user.json::<Value>());
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = TestApp::new().await;

    let response = app.server.post("/login").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(
        body["details"]["fields"],
        json!({"email": "required", "password": "required"})
    );
}

// ==============================================================
// Bearer gate
// ==============================================================

#[tokio::test]
async fn test_create_without_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.server.post("/users").json(&bob()).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["code"], "UNAUTHORIZED");

    let token = app.login().await;
    let users = app
        .server
        .get("/users")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    assert_eq!(users.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_login_then_create_hides_password() {
    let app = TestApp::new().await;
    let token = app.login().await;

    let response = app
        .server
        .post("/users")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&bob())
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["username"], "bobby");
    assert_eq!(body["email"], "bob@example.com");
    assert!(body.get("password").is_none());
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn test_expired_and_tampered_tokens_get_same_response() {
    let app = TestApp::new().await;
    let token = app.login().await;

    let gate = TokenGate::new(SECRET, Duration::hours(1)).unwrap();
    let identity = Identity {
        user_id: Uuid::new_v4(),
        email: "alice@example.com".to_string(),
    };
    let expired = gate
        .issue_at(&identity, Utc::now() - Duration::hours(2))
        .unwrap();
    let tampered = format!("{}x", token);

    let expired_response = app
        .server
        .get("/users")
        .add_header(header::AUTHORIZATION, bearer(&expired))
        .await;
    let tampered_response = app
        .server
        .get("/users")
        .add_header(header::AUTHORIZATION, bearer(&tampered))
        .await;

    expired_response.assert_status(StatusCode::UNAUTHORIZED);
    tampered_response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        expired_response.json::<Value>(),
        tampered_response.json::<Value>()
    );
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/users")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Basic YWxpY2U6c2VjcmV0"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_whoami_returns_identity() {
    let app = TestApp::new().await;
    let token = app.login().await;

    let response = app
        .server
        .get("/whoami")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["email"], "alice@example.com");
    assert!(Uuid::parse_str(body["user_id"].as_str().unwrap()).is_ok());

    app.server
        .get("/whoami")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ==============================================================
// CRUD
// ==============================================================

#[tokio::test]
async fn test_create_with_empty_body_reports_every_required_field() {
    let app = TestApp::new().await;
    let token = app.login().await;

    let response = app
        .server
        .post("/users")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["details"]["fields"],
        json!({"username": "required", "email": "required", "password": "required"})
    );
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestApp::new().await;
    let token = app.login().await;

    let response = app
        .server
        .post("/users")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({
            "username": "alice-again",
            "email": "alice@example.com",
            "password": "secret123"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["details"]["fields"], json!({"email": "duplicate"}));
}

#[tokio::test]
async fn test_malformed_json_body() {
    let app = TestApp::new().await;
    let token = app.login().await;

    let response = app
        .server
        .post("/users")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .add_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .bytes("{not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "DECODING_ERROR");
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let app = TestApp::new().await;
    let token = app.login().await;

    let created: Value = app
        .server
        .post("/users")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&bob())
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let response = app
        .server
        .patch(&format!("/users/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"username": "robert", "id": Uuid::new_v4()}))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["id"], id);
    assert_eq!(body["username"], "robert");
    assert_eq!(body["email"], "bob@example.com");
    assert_eq!(body["created_at"], created["created_at"]);

    // the stored password hash is untouched
    app.server
        .post("/login")
        .json(&json!({"email": "bob@example.com", "password": "hunter22"}))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let app = TestApp::new().await;
    let token = app.login().await;

    let response = app
        .server
        .put(&format!("/users/{}", Uuid::new_v4()))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"username": "ghost"}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "RECORD_NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_uuid_is_bad_request() {
    let app = TestApp::new().await;
    let token = app.login().await;

    let response = app
        .server
        .get("/users/not-a-uuid")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "DECODING_ERROR");
}

#[tokio::test]
async fn test_delete_twice() {
    let app = TestApp::new().await;
    let token = app.login().await;

    let created: Value = app
        .server
        .post("/users")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&bob())
        .await
        .json();
    let path = format!("/users/{}", created["id"].as_str().unwrap());

    app.server
        .delete(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .delete(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .get(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
