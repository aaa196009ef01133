//! Shared harness for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use harmoni::account::UserRepository;
use harmoni::call_relay::CallTokenRelay;
use harmoni::config::{Argon2Config, CallProviderConfig};
use harmoni::db::{Database, schema};
use harmoni::gateway::{build_router, state::AppState};
use harmoni::session::{CookieSettings, SqliteSessionStore};
use harmoni::user_auth::{PasswordService, UserAuthService};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_API_KEY: &str = "test-key";

pub struct TestOptions {
    pub skip_signup_validation: bool,
    pub provider_url: String,
    pub api_key: Option<String>,
    pub provider_timeout_ms: u64,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            skip_signup_validation: false,
            // Nothing listens here; tests that reach the provider set a mock url
            provider_url: "http://127.0.0.1:9".to_string(),
            api_key: Some(TEST_API_KEY.to_string()),
            provider_timeout_ms: 2_000,
        }
    }
}

/// Router over a fresh in-memory store
pub async fn app(opts: TestOptions) -> Router {
    let db = Database::in_memory().await.unwrap();
    app_with_stores(db.clone(), db, opts).await
}

/// Router over caller-provided stores (schemas are created if missing)
pub async fn app_with_stores(users_db: Database, sessions_db: Database, opts: TestOptions) -> Router {
    schema::init_users_schema(&users_db).await.unwrap();
    schema::init_sessions_schema(&sessions_db).await.unwrap();

    let sessions = SqliteSessionStore::new(sessions_db.clone());
    let session_cookie = CookieSettings::new(TEST_SECRET, "/api", 3600, false);
    let passwords = PasswordService::new(&Argon2Config {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();
    let user_auth = UserAuthService::new(
        UserRepository::new(users_db.clone()),
        passwords,
        opts.skip_signup_validation,
    );
    let call_relay = CallTokenRelay::new(&CallProviderConfig {
        base_url: opts.provider_url,
        api_key: opts.api_key,
        timeout_ms: opts.provider_timeout_ms,
    })
    .unwrap();

    let state = Arc::new(AppState::new(
        user_auth,
        sessions,
        session_cookie,
        call_relay,
        users_db,
        sessions_db,
    ));
    build_router(state, None)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `sessionId=...` pair from `Set-Cookie`, ready to send back as `Cookie`
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|pair| pair.trim().to_string())
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn post_json(app: &Router, path: &str, body: Value, cookie: Option<&str>) -> TestResponse {
    let mut builder = Request::post(path).header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn get(app: &Router, path: &str, cookie: Option<&str>) -> TestResponse {
    let mut builder = Request::get(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub fn ann() -> Value {
    serde_json::json!({
        "name": "Ann",
        "email": "ann@x.com",
        "password": "secret1",
        "mobile": "5551234567"
    })
}

/// Sign up and log in as Ann, returning the session cookie pair
pub async fn logged_in_ann(app: &Router) -> String {
    let signup = post_json(app, "/api/signup", ann(), None).await;
    assert_eq!(signup.status, StatusCode::CREATED);

    let login = post_json(
        app,
        "/api/login",
        serde_json::json!({"email": "ann@x.com", "password": "secret1"}),
        None,
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    login.session_cookie().unwrap()
}
