#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use lineup_analytics::config::AppConfig;
use lineup_analytics::db::LocalRepository;
use lineup_analytics::http::{create_router, AppState};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub const SUPER_EMAIL: &str = "root@example.com";
pub const SUPER_PASSWORD: &str = "root-pw";
pub const ADMIN_EMAIL: &str = "ops@example.com";
pub const ADMIN_PASSWORD: &str = "ops-pw";

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Store contents shared by the integration tests.
///
/// `ana` owns one live workspace and one dangling reference. Her workspace
/// lists three lineups: `l1` carries its own timestamp, `l2` only has one in
/// the embedded entry and `l3` is missing from the lineups collection.
pub fn seed() -> Value {
    json!({
        "users": [
            {"_id": {"$oid": "650000000000000000000001"},
             "email": "ana@example.com", "username": "ana",
             "registered_at": {"$date": "2023-11-02T09:30:00Z"},
             "location": "Lisbon", "industry": "Media",
             "workspaces": [{"$oid": "660000000000000000000001"}, "ws-missing"],
             "credits": 120},
            {"email": "bo@example.com", "username": "bo", "workspaces": ["ws-2"]}
        ],
        "workspaces": [
            {"_id": {"$oid": "660000000000000000000001"}, "name": "Studio",
             "screenplays": {"s1": {}},
             "lineups": {
                "l1": {"created_at": "2024-03-04T10:05:00"},
                "l2": {"createdAt": "2024-03-04T10:45:00Z"},
                "l3": {"created_at": "2024-03-05T08:00:00"}
             }},
            {"_id": "ws-2", "name": "Side",
             "lineups": {"l4": {"creation_date": {"$date": "2024-03-11T12:00:00Z"}}}}
        ],
        "lineups": [
            {"_id": "l1", "created_at": "2024-03-04T10:05:00", "clips": [{"id": 1}], "style": "bold"},
            {"_id": "l2", "audio": {"track": "a.mp3"}},
            {"_id": "l4", "created_at": {"$date": {"$numberLong": "1710158400000"}}}
        ]
    })
}

pub fn seeded_repository() -> LocalRepository {
    LocalRepository::from_snapshot(seed()).unwrap()
}

pub fn test_config(protect_reports: bool) -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.secret_key = "integration-secret".to_string();
    config.auth.password_iterations = 1_000;
    config.auth.protect_reports = protect_reports;
    config
}

/// Router over `repo` with one super admin and one regular admin stored.
pub async fn app_with(repo: LocalRepository, protect_reports: bool) -> Router {
    let state = AppState::from_config(Arc::new(repo), &test_config(protect_reports));
    state
        .auth
        .create_admin(SUPER_EMAIL, SUPER_PASSWORD, true)
        .await
        .unwrap();
    state
        .auth
        .create_admin(ADMIN_EMAIL, ADMIN_PASSWORD, false)
        .await
        .unwrap();
    create_router(state)
}

pub async fn app(protect_reports: bool) -> Router {
    app_with(seeded_repository(), protect_reports).await
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn login_request(email: &str, password: &str) -> Request<Body> {
    let form = format!(
        "username={}&password={}",
        email.replace('@', "%40"),
        password
    );
    Request::builder()
        .method("POST")
        .uri("/admin/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap()
}

pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = send(app, login_request(email, password)).await;
    assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
    response.body["access_token"].as_str().unwrap().to_string()
}
