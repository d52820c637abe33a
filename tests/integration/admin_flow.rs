//! Admin surface gating and listings.

use http::StatusCode;

use crate::helpers::{TestApp, test_config};

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn admin_endpoints_hidden_when_disabled() {
    let mut config = test_config();
    config.admin.enabled = false;
    let app = TestApp::with_config(config).await;

    let id = app
        .create_account("root@example.com", "password123", true)
        .await;
    app.grant_role(id, "admin").await;
    let (access, _) = app.login("root@example.com", "password123").await;

    let response = app
        .request("GET", "/admin/accounts", None, Some(&access))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn admin_endpoints_require_admin_role() {
    let app = TestApp::new().await;
    let id = app
        .create_account("plain@example.com", "password123", true)
        .await;
    app.grant_role(id, "user").await;
    let (access, _) = app.login("plain@example.com", "password123").await;

    let response = app
        .request("GET", "/admin/accounts", None, Some(&access))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn admin_endpoints_require_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/admin/accounts", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn admin_lists_accounts_paginated() {
    let app = TestApp::new().await;
    let admin = app
        .create_account("boss@example.com", "password123", true)
        .await;
    app.grant_role(admin, "admin").await;
    app.create_account("worker1@example.com", "password123", true)
        .await;
    app.create_account("worker2@example.com", "password123", true)
        .await;
    let (access, _) = app.login("boss@example.com", "password123").await;

    let response = app
        .request(
            "GET",
            "/admin/accounts?page=1&per_page=2",
            None,
            Some(&access),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["items"].as_array().map(|a| a.len()), Some(2));
    assert_eq!(response.body["page"].as_i64(), Some(1));
    assert_eq!(response.body["per_page"].as_i64(), Some(2));
    assert!(
        response.body["items"][0].get("password_hash").is_none(),
        "hash must never leave the server"
    );
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn admin_lists_login_attempts() {
    let app = TestApp::new().await;
    let admin = app
        .create_account("audit@example.com", "password123", true)
        .await;
    app.grant_role(admin, "admin").await;
    let (access, _) = app.login("audit@example.com", "password123").await;

    let response = app
        .request("GET", "/admin/login-attempts", None, Some(&access))
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let items = response.body["items"].as_array().unwrap();
    assert!(!items.is_empty(), "the login above must appear in the ledger");
    assert_eq!(items[0]["email"].as_str(), Some("audit@example.com"));
    assert_eq!(items[0]["success"].as_bool(), Some(true));
}
