//! Integration tests for the authentication stage and token endpoints.

mod helpers;

use axum::http::StatusCode;
use chrono::TimeDelta;
use g7kaih_entity::user::UserRole;

#[tokio::test]
async fn test_me_requires_authorization_header() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/v1/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
    assert_eq!(response.body["message"], "Authorization header required");
}

#[tokio::test]
async fn test_me_returns_identity() {
    let app = helpers::TestApp::new();
    let (user, token) = app.token_for(UserRole::Guru);

    let response = app
        .request("GET", "/api/v1/auth/me", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["user_id"], user.to_string());
    assert_eq!(response.body["data"]["role"], "guru");
    assert_eq!(response.body["data"]["email"], "user@g7kaih.test");
}

#[tokio::test]
async fn test_bearer_scheme_is_case_insensitive() {
    let app = helpers::TestApp::new();
    let (_, token) = app.token_for(UserRole::Siswa);

    let req = axum::http::Request::builder()
        .uri("/api/v1/auth/me")
        .header("Authorization", format!("bearer {token}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_scheme_is_rejected() {
    let app = helpers::TestApp::new();
    let (_, token) = app.token_for(UserRole::Siswa);

    let req = axum::http::Request::builder()
        .uri("/api/v1/auth/me")
        .header("Authorization", format!("Token {token}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body["message"],
        "Invalid authorization header format"
    );
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = helpers::TestApp::new();
    let (_, token) = app.token_for(UserRole::Admin);

    app.clock.advance(TimeDelta::hours(24));
    let response = app
        .request("GET", "/api/v1/auth/me", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    app.clock.advance(TimeDelta::seconds(1));
    let response = app
        .request("GET", "/api/v1/auth/me", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let app = helpers::TestApp::new();
    let mut other = helpers::test_config();
    other.auth.jwt_secret = "some-other-secret".to_string();
    let other_app = helpers::TestApp::with_config(other);
    let (_, token) = other_app.token_for(UserRole::Admin);

    let response = app
        .request("GET", "/api/v1/auth/me", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_cannot_authenticate() {
    let app = helpers::TestApp::new();
    let pair = app
        .tokens
        .issue(uuid::Uuid::new_v4(), None, UserRole::Siswa)
        .unwrap();

    let response = app
        .request("GET", "/api/v1/auth/me", None, Some(&pair.refresh_token))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let app = helpers::TestApp::new();
    let user = uuid::Uuid::new_v4();
    let pair = app
        .tokens
        .issue(user, Some("wali@g7kaih.test"), UserRole::Guruwali)
        .unwrap();

    app.clock.advance(TimeDelta::hours(30));
    let response = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(serde_json::json!({ "refresh_token": pair.refresh_token })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["token_type"], "Bearer");
    let access = response.body["data"]["access_token"].as_str().unwrap();
    assert_ne!(access, pair.access_token);

    let me = app
        .request("GET", "/api/v1/auth/me", None, Some(access))
        .await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["user_id"], user.to_string());
    assert_eq!(me.body["data"]["role"], "guruwali");
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = helpers::TestApp::new();
    let (_, token) = app.token_for(UserRole::Siswa);

    let response = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(serde_json::json!({ "refresh_token": token })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rejects_expired_refresh_token() {
    let app = helpers::TestApp::new();
    let pair = app
        .tokens
        .issue(uuid::Uuid::new_v4(), None, UserRole::Siswa)
        .unwrap();

    app.clock.advance(TimeDelta::hours(168) + TimeDelta::seconds(1));
    let response = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(serde_json::json!({ "refresh_token": pair.refresh_token })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_requires_body() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(serde_json::json!({})),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}
