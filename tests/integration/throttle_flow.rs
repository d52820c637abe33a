//! Rate-limit scope and the login lockout path.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, test_config};

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn sixth_login_attempt_is_blocked() {
    let mut config = test_config();
    config.rate_limit.login_max_requests = 5;
    let app = TestApp::with_config(config).await;

    // Five failed logins for a nonexistent account fill the ledger.
    for _ in 0..5 {
        let response = app
            .request(
                "POST",
                "/auth/login",
                Some(json!({ "email": "bob@example.com", "password": "password123" })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    // The sixth attempt is refused regardless of credentials.
    let blocked = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "bob@example.com", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(blocked.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(
        blocked.headers.get(http::header::RETRY_AFTER).is_some(),
        "429 must carry Retry-After"
    );

    // No ledger row is written for the blocked attempt.
    let attempts: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM login_attempts WHERE email = $1")
            .bind("bob@example.com")
            .fetch_one(&app.db_pool)
            .await
            .unwrap();
    assert_eq!(attempts, 5);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn general_limiter_covers_only_account_mutations() {
    let mut config = test_config();
    config.rate_limit.max_requests = 3;
    let app = TestApp::with_config(config).await;

    // The limiter counts every request to the throttled routes, even
    // ones that fail validation.
    for _ in 0..3 {
        let response = app
            .request(
                "POST",
                "/auth/register",
                Some(json!({ "email": "walt@example.com", "password": "short" })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
    let throttled = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "email": "walt@example.com", "password": "short" })),
            None,
        )
        .await;
    assert_eq!(throttled.status, StatusCode::TOO_MANY_REQUESTS);

    // The session and token routes stay reachable from the same IP:
    // they fail on their own terms, never with 429.
    for _ in 0..5 {
        let me = app.request("GET", "/auth/me", None, None).await;
        assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    }
    let refresh = app.request("POST", "/auth/refresh", None, None).await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);

    // Login is outside the general limiter; only its own check applies.
    let login = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "nobody@example.com", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
}
