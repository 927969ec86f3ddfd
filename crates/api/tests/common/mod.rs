#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use vinyl_api::auth::jwt::{generate_access_token, JwtConfig};
use vinyl_api::auth::password::hash_password;
use vinyl_api::config::ServerConfig;
use vinyl_api::router::build_app_router;
use vinyl_api::state::AppState;
use vinyl_cdn::{CdnError, CdnStore};
use vinyl_core::roles::{ROLE_ADMIN, ROLE_USER};
use vinyl_db::models::user::{CreateUser, User};
use vinyl_db::repositories::UserRepo;

pub const TEST_PASSWORD: &str = "needle-drop-42";

// ---------------------------------------------------------------------------
// Config and app
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults and a known JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
        cloudinary: None,
        cdn_outbox_interval: Duration::from_secs(30),
        admin: None,
    }
}

/// Build the full application router with a fresh [`FakeCdn`].
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_cdn(pool, Arc::new(FakeCdn::default()))
}

/// Build the full application router around the given CDN double, so tests
/// can inspect or sabotage CDN calls.
pub fn build_test_app_with_cdn(pool: PgPool, cdn: Arc<FakeCdn>) -> Router {
    build_app(pool, Some(cdn))
}

/// Build the full application router with no CDN configured.
pub fn build_test_app_without_cdn(pool: PgPool) -> Router {
    build_app(pool, None)
}

fn build_app(pool: PgPool, cdn: Option<Arc<FakeCdn>>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cdn: cdn.map(|cdn| cdn as Arc<dyn CdnStore>),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// CDN double
// ---------------------------------------------------------------------------

/// In-memory [`CdnStore`] that records every delete and fails on demand.
#[derive(Default)]
pub struct FakeCdn {
    deleted: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    fail_all: Mutex<bool>,
}

impl FakeCdn {
    /// Make deletes of `public_id` fail.
    pub fn fail_on(&self, public_id: &str) {
        self.failing.lock().unwrap().insert(public_id.to_string());
    }

    /// Make every delete fail (`true`) or succeed (`false`).
    pub fn set_fail_all(&self, fail: bool) {
        *self.fail_all.lock().unwrap() = fail;
    }

    /// Public ids successfully deleted so far, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl CdnStore for FakeCdn {
    async fn delete(&self, public_id: &str) -> Result<(), CdnError> {
        if *self.fail_all.lock().unwrap() || self.failing.lock().unwrap().contains(public_id) {
            return Err(CdnError::Rejected("simulated outage".into()));
        }
        self.deleted.lock().unwrap().push(public_id.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Bearer token for a freshly created admin.
pub async fn admin_token(pool: &PgPool) -> String {
    let user = create_user(pool, "admin@example.com", ROLE_ADMIN).await;
    generate_access_token(user.id, &user.role, &test_config().jwt).unwrap()
}

/// Bearer token for a freshly created regular user.
pub async fn user_token(pool: &PgPool) -> String {
    let user = create_user(pool, "listener@example.com", ROLE_USER).await;
    generate_access_token(user.id, &user.role, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Send one request through the router.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
