//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use g7kaih_api::extractors::CurrentContext;
use g7kaih_api::{AppState, RouteGroups, build_app};
use g7kaih_auth::{ManualClock, TokenService};
use g7kaih_core::config::AppConfig;
use g7kaih_entity::user::UserRole;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const DEFAULT_PEER: &str = "127.0.0.1:40000";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: axum::Router,
    /// Token service sharing the app's clock
    pub tokens: TokenService,
    /// Clock driving token expiry
    pub clock: Arc<ManualClock>,
    /// Application config
    pub config: AppConfig,
}

/// Config with a secret, rate limiting off, and the development origins.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.rate_limit.enabled = false;
    config
}

fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_750_000_000, 0).expect("valid timestamp")
}

/// Echoes what the gate attached to the request.
async fn whoami(CurrentContext(ctx): CurrentContext) -> Json<Value> {
    Json(json!({
        "request_id": ctx.request_id,
        "client_ip": ctx.client_ip.map(|ip| ip.to_string()),
        "subject": ctx.subject_id().ok(),
        "role": ctx.role().ok(),
    }))
}

/// One probe route per access tier.
pub fn probe_routes() -> RouteGroups {
    RouteGroups::new()
        .public(Router::new().route("/ping", get(whoami)))
        .authenticated(Router::new().route("/activities", get(whoami)))
        .teacher(Router::new().route("/activities", post(whoami)))
        .teacher(Router::new().route("/teacher/students", get(whoami)))
        .homeroom(Router::new().route("/guruwali/students", get(whoami)))
        .parent(Router::new().route("/orangtua/children", get(whoami)))
        .admin(Router::new().route("/admin/users", get(whoami)))
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application from an explicit config
    pub fn with_config(config: AppConfig) -> Self {
        let clock = Arc::new(ManualClock::new(start_time()));
        let tokens =
            TokenService::with_clock(&config.auth, clock.clone()).expect("valid auth config");
        let state = AppState::new(config.clone(), tokens.clone()).expect("valid app config");
        let router = build_app(state, probe_routes());

        Self {
            router,
            tokens,
            clock,
            config,
        }
    }

    /// Issue an access token for a fresh user with `role`
    pub fn token_for(&self, role: UserRole) -> (Uuid, String) {
        let user = Uuid::new_v4();
        let pair = self
            .tokens
            .issue(user, Some("user@g7kaih.test"), role)
            .expect("issue tokens");
        (user, pair.access_token)
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a prepared request from the default peer address
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        self.send_from(DEFAULT_PEER, req).await
    }

    /// Send a prepared request as if it arrived from `peer`
    pub async fn send_from(&self, peer: &str, mut req: Request<Body>) -> TestResponse {
        let addr: SocketAddr = peer.parse().expect("valid peer address");
        req.extensions_mut().insert(ConnectInfo(addr));

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            body_len: body_bytes.len(),
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body (`Null` if empty or not JSON)
    pub body: Value,
    /// Raw body length
    pub body_len: usize,
}

impl TestResponse {
    /// Header value as a string, if present
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
