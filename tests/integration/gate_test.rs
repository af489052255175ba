//! Integration tests for the global gate stages: tagging, origin check,
//! IP allow-list, and admission control.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};

fn get(path: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(path)
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let id = response.header("x-request-id").expect("request id header");
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_inbound_request_id_is_propagated() {
    let app = helpers::TestApp::new();

    let req = get("/api/v1/ping")
        .header("X-Request-ID", "trace-abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.header("x-request-id"), Some("trace-abc-123"));
    assert_eq!(response.body["request_id"], "trace-abc-123");
}

#[tokio::test]
async fn test_request_id_echoed_on_rejection() {
    let app = helpers::TestApp::new();

    let req = get("/api/v1/auth/me")
        .header("X-Request-ID", "rejected-1")
        .body(Body::empty())
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("x-request-id"), Some("rejected-1"));
}

#[tokio::test]
async fn test_service_headers_are_set() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.header("x-service-name"), Some("g7kaih-api"));
    assert_eq!(response.header("x-service-version"), Some("1.0.0"));
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_allowed_origin_is_echoed() {
    let app = helpers::TestApp::new();

    let req = get("/api/v1/ping")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("access-control-allow-origin"),
        Some("http://localhost:3000")
    );
    assert_eq!(
        response.header("access-control-allow-credentials"),
        Some("true")
    );
    assert_eq!(response.header("access-control-max-age"), Some("43200"));
    assert!(response.header("access-control-allow-methods").is_some());
    assert!(response.header("access-control-allow-headers").is_some());
    assert_eq!(response.header("vary"), Some("Origin"));
}

#[tokio::test]
async fn test_disallowed_origin_is_forwarded_without_headers() {
    let app = helpers::TestApp::new();

    let req = get("/api/v1/ping")
        .header("Origin", "https://evil.com")
        .body(Body::empty())
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("access-control-allow-origin").is_none());
    assert_eq!(response.header("vary"), Some("Origin"));
}

#[tokio::test]
async fn test_request_without_origin_has_no_vary() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/v1/ping", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("vary").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/v1/nope", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
    assert_eq!(response.body["message"], "Route not found");
    assert!(response.header("x-request-id").is_some());
}

#[tokio::test]
async fn test_preflight_short_circuits_with_no_content() {
    let app = helpers::TestApp::new();

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/admin/users")
        .header("Origin", "http://localhost:3001")
        .header("Access-Control-Request-Method", "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.send(req).await;

    // never reaches the authentication stage
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(response.body_len, 0);
    assert_eq!(
        response.header("access-control-allow-origin"),
        Some("http://localhost:3001")
    );
}

#[tokio::test]
async fn test_wildcard_origins_in_custom_mode() {
    let mut config = helpers::test_config();
    config.cors.mode = "custom".to_string();
    config.cors.custom_origins = vec![
        "https://app.example.com".to_string(),
        "https://*.staging.example.com".to_string(),
    ];
    let app = helpers::TestApp::with_config(config);

    let cases = [
        ("https://app.example.com", true),
        ("https://evil.com", false),
        ("https://x.staging.example.com", true),
        ("https://staging.example.com", false),
        ("http://localhost:3000", false),
    ];
    for (origin, allowed) in cases {
        let req = get("/api/v1/ping")
            .header("Origin", origin)
            .body(Body::empty())
            .unwrap();
        let response = app.send(req).await;
        assert_eq!(
            response.header("access-control-allow-origin").is_some(),
            allowed,
            "{origin}"
        );
    }
}

#[tokio::test]
async fn test_frontend_ips_become_origins() {
    let mut config = helpers::test_config();
    config.cors.mode = "production".to_string();
    config.cors.allowed_frontend_ips = vec!["192.168.1.20".to_string()];
    let app = helpers::TestApp::with_config(config);

    let req = get("/api/v1/ping")
        .header("Origin", "https://192.168.1.20")
        .body(Body::empty())
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(
        response.header("access-control-allow-origin"),
        Some("https://192.168.1.20")
    );
}

#[tokio::test]
async fn test_ip_allowlist_rejects_unknown_clients() {
    let mut config = helpers::test_config();
    config.cors.allowed_backend_ips = vec!["10.1.1.1".to_string()];
    let app = helpers::TestApp::with_config(config);

    let req = get("/api/v1/ping").body(Body::empty()).unwrap();
    let response = app.send_from("10.9.9.9:5000", req).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN_ORIGIN");
    assert_eq!(response.body["message"], "Access denied from this IP");

    let req = get("/api/v1/ping").body(Body::empty()).unwrap();
    let response = app.send_from("10.1.1.1:5000", req).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_ip_allowlist_runs_before_authentication() {
    let mut config = helpers::test_config();
    config.cors.allowed_backend_ips = vec!["10.1.1.1".to_string()];
    let app = helpers::TestApp::with_config(config);

    let response = app.request("GET", "/api/v1/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_trusted_proxy_forwarded_address_is_used() {
    let mut config = helpers::test_config();
    config.server.trusted_proxies = vec!["10.0.0.1".to_string()];
    config.cors.allowed_backend_ips = vec!["198.51.100.7".to_string()];
    let app = helpers::TestApp::with_config(config);

    let req = get("/api/v1/ping")
        .header("X-Forwarded-For", "198.51.100.7")
        .body(Body::empty())
        .unwrap();
    let response = app.send_from("10.0.0.1:443", req).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["client_ip"], "198.51.100.7");

    // the header is ignored from an untrusted peer
    let req = get("/api/v1/ping")
        .header("X-Forwarded-For", "198.51.100.7")
        .body(Body::empty())
        .unwrap();
    let response = app.send_from("203.0.113.5:443", req).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rate_limit_rejects_after_burst() {
    let mut config = helpers::test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.requests_per_minute = 60;
    config.rate_limit.burst = Some(5);
    let app = helpers::TestApp::with_config(config);

    for _ in 0..5 {
        let req = get("/api/v1/ping").body(Body::empty()).unwrap();
        assert_eq!(app.send(req).await.status, StatusCode::OK);
    }

    let req = get("/api/v1/ping").body(Body::empty()).unwrap();
    let response = app.send(req).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.body["message"], "Too many requests");
    assert!(response.header("retry-after").is_none());
    assert!(response.header("x-request-id").is_some());

    // another client has its own bucket
    let req = get("/api/v1/ping").body(Body::empty()).unwrap();
    let response = app.send_from("127.0.0.2:40000", req).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_runs_before_authentication() {
    let mut config = helpers::test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.burst = Some(1);
    let app = helpers::TestApp::with_config(config);

    let first = app.request("GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(first.status, StatusCode::UNAUTHORIZED);

    let second = app.request("GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
}
