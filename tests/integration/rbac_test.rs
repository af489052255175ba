//! Integration tests for role tiers.

mod helpers;

use axum::http::StatusCode;
use g7kaih_entity::user::UserRole;

async fn status_for(app: &helpers::TestApp, method: &str, path: &str, role: UserRole) -> StatusCode {
    let (_, token) = app.token_for(role);
    app.request(method, path, None, Some(&token)).await.status
}

#[tokio::test]
async fn test_public_route_needs_no_token() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/v1/ping", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["subject"].is_null());
}

#[tokio::test]
async fn test_authenticated_route_admits_every_role() {
    let app = helpers::TestApp::new();

    for role in UserRole::ALL {
        assert_eq!(
            status_for(&app, "GET", "/api/v1/activities", role).await,
            StatusCode::OK,
            "{role}"
        );
    }
    let anonymous = app.request("GET", "/api/v1/activities", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_student_is_forbidden_from_teacher_routes() {
    let app = helpers::TestApp::new();

    let (_, token) = app.token_for(UserRole::Siswa);
    let response = app
        .request("GET", "/api/v1/teacher/students", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");
    assert_eq!(response.body["message"], "Insufficient permissions");
}

#[tokio::test]
async fn test_teacher_tier() {
    let app = helpers::TestApp::new();
    let expected = [
        (UserRole::Admin, StatusCode::OK),
        (UserRole::Guru, StatusCode::OK),
        (UserRole::Guruwali, StatusCode::OK),
        (UserRole::Siswa, StatusCode::FORBIDDEN),
        (UserRole::Orangtua, StatusCode::FORBIDDEN),
    ];
    for (role, status) in expected {
        assert_eq!(
            status_for(&app, "GET", "/api/v1/teacher/students", role).await,
            status,
            "{role}"
        );
    }
}

#[tokio::test]
async fn test_homeroom_tier() {
    let app = helpers::TestApp::new();
    let expected = [
        (UserRole::Admin, StatusCode::OK),
        (UserRole::Guru, StatusCode::FORBIDDEN),
        (UserRole::Guruwali, StatusCode::OK),
        (UserRole::Siswa, StatusCode::FORBIDDEN),
        (UserRole::Orangtua, StatusCode::FORBIDDEN),
    ];
    for (role, status) in expected {
        assert_eq!(
            status_for(&app, "GET", "/api/v1/guruwali/students", role).await,
            status,
            "{role}"
        );
    }
}

#[tokio::test]
async fn test_parent_tier_admits_only_parents() {
    let app = helpers::TestApp::new();

    for role in UserRole::ALL {
        let expected = if role == UserRole::Orangtua {
            StatusCode::OK
        } else {
            StatusCode::FORBIDDEN
        };
        assert_eq!(
            status_for(&app, "GET", "/api/v1/orangtua/children", role).await,
            expected,
            "{role}"
        );
    }
}

#[tokio::test]
async fn test_admin_tier() {
    let app = helpers::TestApp::new();

    assert_eq!(
        status_for(&app, "GET", "/api/v1/admin/users", UserRole::Admin).await,
        StatusCode::OK
    );
    assert_eq!(
        status_for(&app, "GET", "/api/v1/admin/users", UserRole::Guruwali).await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_role_check_runs_after_authentication() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/v1/admin/users", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tiers_share_a_path_by_method() {
    let app = helpers::TestApp::new();

    assert_eq!(
        status_for(&app, "GET", "/api/v1/activities", UserRole::Siswa).await,
        StatusCode::OK
    );
    assert_eq!(
        status_for(&app, "POST", "/api/v1/activities", UserRole::Siswa).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        status_for(&app, "POST", "/api/v1/activities", UserRole::Guru).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_handler_sees_identity() {
    let app = helpers::TestApp::new();
    let (user, token) = app.token_for(UserRole::Guru);

    let response = app
        .request("GET", "/api/v1/teacher/students", None, Some(&token))
        .await;

    assert_eq!(response.body["subject"], user.to_string());
    assert_eq!(response.body["role"], "guru");
    assert_eq!(response.body["client_ip"], "127.0.0.1");
}
