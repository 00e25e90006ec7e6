//! Registration and login over HTTP.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;

use common::{Harness, Reply};
use shardgate_auth::{TokenResponse, TOKEN_TTL_HOURS};

#[tokio::test]
async fn register_returns_token_valid_for_72_hours() {
    let h = Harness::new(Reply::Summary);
    let before = Utc::now().timestamp();

    let response = h
        .server
        .post("/user/new")
        .json(&json!({"login": "ann@example.com", "password": "abcdef"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let token: TokenResponse = response.json();
    let ttl = TOKEN_TTL_HOURS * 3600;
    assert!(token.exp >= before + ttl && token.exp <= Utc::now().timestamp() + ttl);
    assert!(h.issuer.verify(&token.token).is_ok());
    assert_eq!(h.store.account_count(), 1);
}

#[tokio::test]
async fn register_rejects_short_and_empty_passwords() {
    let h = Harness::new(Reply::Summary);

    let response = h
        .server
        .post("/user/new")
        .json(&json!({"login": "ann", "password": "abc"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Password should be longer than 6 symbols");

    let response = h
        .server
        .post("/user/new")
        .json(&json!({"login": "ann"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Password is required");
    assert_eq!(h.store.account_count(), 0);
}

#[tokio::test]
async fn register_twice_reports_login_in_use() {
    let h = Harness::new(Reply::Summary);
    let body = json!({"login": "ann", "password": "abcdef"});

    h.server.post("/user/new").json(&body).await;
    let response = h.server.post("/user/new").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Login address already in use");
}

#[tokio::test]
async fn malformed_body_is_invalid_request() {
    let h = Harness::new(Reply::Summary);

    let response = h.server.post("/user/login").text("{not json").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "invalid request");
}

#[tokio::test]
async fn empty_login_is_not_found() {
    let h = Harness::new(Reply::Summary);

    let response = h
        .server
        .post("/user/login")
        .json(&json!({"login": "", "password": "abcdef"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Login address not found");
}

#[tokio::test]
async fn login_flows() {
    let h = Harness::new(Reply::Summary);
    let registered: TokenResponse = h
        .server
        .post("/user/new")
        .json(&json!({"login": "ann", "password": "abcdef"}))
        .await
        .json();

    let response = h
        .server
        .post("/user/login")
        .json(&json!({"login": "bob", "password": "abcdef"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Login address not found");

    let response = h
        .server
        .post("/user/login")
        .json(&json!({"login": "ann", "password": "wrong-password"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text(),
        "Invalid login credentials. Please try again"
    );

    let response = h
        .server
        .post("/user/login")
        .json(&json!({"login": "ann", "password": "abcdef"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let fresh: TokenResponse = response.json();
    assert_ne!(fresh.token, registered.token);
}

#[tokio::test]
async fn api_prefix_serves_account_routes() {
    let h = Harness::new(Reply::Summary);
    let body = json!({"login": "ann", "password": "abcdef"});

    let response = h.server.post("/api/user/new").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = h.server.post("/api/user/login").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::OK);
}
