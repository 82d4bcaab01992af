//! Bearer-token authentication over HTTP

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::{Value, json};

#[tokio::test]
async fn health_needs_no_token() {
    let app = common::create_test_app();
    let response = app.server.get("/api/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn adaptive_routes_reject_missing_token() {
    let app = common::create_test_app();

    for path in ["/api/adaptive/progress", "/api/adaptive/analytics", "/api/auth/me"] {
        let response = app.server.get(path).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["code"], "UNAUTHORIZED");
    }

    let response = app
        .server
        .post("/api/adaptive/start")
        .json(&json!({}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let app = common::create_test_app();
    let (name, value) = common::bearer("not-a-real-token");
    let response = app
        .server
        .get("/api/adaptive/progress")
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = common::create_test_app();
    let session = app
        .state
        .sessions
        .issue(app.user_id, Duration::seconds(-5))
        .unwrap();
    let (name, value) = common::bearer(&session.token);
    let response = app.server.get("/api/auth/me").add_header(name, value).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("expired"));
}

#[tokio::test]
async fn me_returns_resolved_user() {
    let app = common::create_test_app();
    let (name, value) = app.auth();
    let response = app.server.get("/api/auth/me").add_header(name, value).await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["user_id"], app.user_id);
    assert_eq!(body["username"], "founder");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn logout_revokes_token() {
    let app = common::create_test_app();
    let (name, value) = app.auth();
    let response = app
        .server
        .post("/api/auth/logout")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["revoked"], true);

    let (name, value) = app.auth();
    let response = app.server.get("/api/auth/me").add_header(name, value).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
