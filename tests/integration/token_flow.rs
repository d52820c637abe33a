//! Refresh, logout, and token-sweep behavior.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn refresh_with_cookie_mints_new_access_token() {
    let app = TestApp::new().await;
    app.create_account("mia@example.com", "password123", true)
        .await;
    let (_, refresh) = app.login("mia@example.com", "password123").await;

    let response = app
        .request_with_cookie("POST", "/auth/refresh", None, None, Some(&refresh))
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert!(response.body.get("access_token").is_some());
    assert_eq!(response.body["account"]["email"].as_str(), Some("mia@example.com"));

    // The secret is not rotated: it stays usable.
    let again = app
        .request_with_cookie("POST", "/auth/refresh", None, None, Some(&refresh))
        .await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn refresh_accepts_body_fallback() {
    let app = TestApp::new().await;
    app.create_account("nina@example.com", "password123", true)
        .await;
    let (_, refresh) = app.login("nina@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn refresh_without_token_rejected() {
    let app = TestApp::new().await;

    let response = app.request("POST", "/auth/refresh", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn refresh_with_unknown_token_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refresh_token": "no-such-secret" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn refresh_with_expired_token_rejected() {
    let app = TestApp::new().await;
    let id = app
        .create_account("omar@example.com", "password123", true)
        .await;

    sqlx::query(
        r#"INSERT INTO refresh_tokens (account_id, token, expires_at)
           VALUES ($1, $2, NOW() - INTERVAL '1 hour')"#,
    )
    .bind(id)
    .bind("expired-secret")
    .execute(&app.db_pool)
    .await
    .unwrap();

    let response = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refresh_token": "expired-secret" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn refresh_for_disabled_account_rejected() {
    let app = TestApp::new().await;
    let id = app
        .create_account("pam@example.com", "password123", true)
        .await;
    let (_, refresh) = app.login("pam@example.com", "password123").await;

    sqlx::query("UPDATE accounts SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app
        .request_with_cookie("POST", "/auth/refresh", None, None, Some(&refresh))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"].as_str(), Some("Account is disabled"));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn logout_revokes_refresh_token_and_is_idempotent() {
    let app = TestApp::new().await;
    app.create_account("quinn@example.com", "password123", true)
        .await;
    let (access, refresh) = app.login("quinn@example.com", "password123").await;

    let first = app
        .request_with_cookie("POST", "/auth/logout", None, Some(&access), Some(&refresh))
        .await;
    assert_eq!(first.status, StatusCode::OK, "{:?}", first.body);

    // The refresh secret is dead now.
    let stale = app
        .request_with_cookie("POST", "/auth/refresh", None, None, Some(&refresh))
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    // Logging out again still succeeds.
    let second = app
        .request_with_cookie("POST", "/auth/logout", None, Some(&access), Some(&refresh))
        .await;
    assert_eq!(second.status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn sweep_removes_only_expired_tokens() {
    let app = TestApp::new().await;
    let id = app
        .create_account("ruth@example.com", "password123", true)
        .await;

    for table in ["refresh_tokens", "email_verifications", "password_resets"] {
        sqlx::query(&format!(
            r#"INSERT INTO {table} (account_id, token, expires_at)
               VALUES ($1, $2, NOW() - INTERVAL '1 hour'),
                      ($1, $3, NOW() + INTERVAL '1 hour')"#,
        ))
        .bind(id)
        .bind(format!("{table}-expired"))
        .bind(format!("{table}-live"))
        .execute(&app.db_pool)
        .await
        .unwrap();
    }
    // Revocation is not expiry: a revoked-but-unexpired refresh token
    // must survive the sweep.
    sqlx::query(
        r#"INSERT INTO refresh_tokens (account_id, token, expires_at, revoked)
           VALUES ($1, 'refresh_tokens-revoked', NOW() + INTERVAL '1 hour', TRUE)"#,
    )
    .bind(id)
    .execute(&app.db_pool)
    .await
    .unwrap();

    app.token_service.sweep_expired().await;

    for table in ["email_verifications", "password_resets"] {
        let remaining: Vec<String> =
            sqlx::query_scalar(&format!("SELECT token FROM {table}"))
                .fetch_all(&app.db_pool)
                .await
                .unwrap();
        assert_eq!(remaining, vec![format!("{table}-live")], "{table}");
    }
    let remaining: Vec<String> =
        sqlx::query_scalar("SELECT token FROM refresh_tokens ORDER BY token")
            .fetch_all(&app.db_pool)
            .await
            .unwrap();
    assert_eq!(
        remaining,
        vec!["refresh_tokens-live", "refresh_tokens-revoked"]
    );
}
