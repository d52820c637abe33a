//! Registration, login, verification, and password-reset flows.

use http::StatusCode;
use serde_json::json;

use gatehouse_auth::federation::FederatedIdentity;

use crate::helpers::TestApp;

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn register_creates_account_and_queues_jobs() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "email": "Alice@Example.com", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(
        response.body["account"]["email"].as_str(),
        Some("alice@example.com"),
        "email must be stored lowercased"
    );
    assert_eq!(response.body["account"]["email_verified"].as_bool(), Some(false));
    assert!(
        response.body["account"].get("password_hash").is_none(),
        "hash must never leave the server"
    );

    let job_types: Vec<String> = sqlx::query_scalar(
        "SELECT job_type FROM outbox_jobs WHERE status = 'pending' ORDER BY job_type",
    )
    .fetch_all(&app.db_pool)
    .await
    .unwrap();
    assert_eq!(job_types, vec!["assign_default_role", "send_verification_email"]);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn register_duplicate_email_conflicts() {
    let app = TestApp::new().await;
    app.create_account("bob@example.com", "password123", true)
        .await;

    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "email": "BOB@example.com", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn register_short_password_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "email": "carol@example.com", "password": "short" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn first_registered_account_becomes_admin() {
    let app = TestApp::new().await;

    app.request(
        "POST",
        "/auth/register",
        Some(json!({ "email": "first@example.com", "password": "password123" })),
        None,
    )
    .await;
    app.request(
        "POST",
        "/auth/register",
        Some(json!({ "email": "second@example.com", "password": "password123" })),
        None,
    )
    .await;

    app.drain_outbox().await;

    let first_roles: Vec<String> = sqlx::query_scalar(
        r#"SELECT r.name FROM roles r
           JOIN account_roles ar ON ar.role_id = r.id
           JOIN accounts a ON a.id = ar.account_id
           WHERE a.email = $1 ORDER BY r.name"#,
    )
    .bind("first@example.com")
    .fetch_all(&app.db_pool)
    .await
    .unwrap();
    assert_eq!(first_roles, vec!["admin", "user"]);

    let second_roles: Vec<String> = sqlx::query_scalar(
        r#"SELECT r.name FROM roles r
           JOIN account_roles ar ON ar.role_id = r.id
           JOIN accounts a ON a.id = ar.account_id
           WHERE a.email = $1 ORDER BY r.name"#,
    )
    .bind("second@example.com")
    .fetch_all(&app.db_pool)
    .await
    .unwrap();
    assert_eq!(second_roles, vec!["user"]);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn login_returns_session_and_refresh_cookie() {
    let app = TestApp::new().await;
    app.create_account("dave@example.com", "password123", true)
        .await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "dave@example.com", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert!(response.body.get("access_token").is_some());
    assert!(response.body.get("access_expires_at").is_some());
    assert!(
        response.body.get("refresh_token").is_none(),
        "refresh secret travels only in the cookie"
    );

    let cookie_header = response
        .headers
        .get(http::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("Set-Cookie missing");
    assert!(cookie_header.starts_with("refresh_token="));
    assert!(cookie_header.contains("HttpOnly"));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn login_failures_are_masked() {
    let app = TestApp::new().await;
    app.create_account("erin@example.com", "password123", true)
        .await;

    // Wrong password and unknown account produce the same message.
    let wrong = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "erin@example.com", "password": "wrongpassword" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "nobody@example.com", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["message"], unknown.body["message"]);
    assert_eq!(wrong.body["message"].as_str(), Some("Invalid credentials"));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn login_unverified_email_rejected() {
    let app = TestApp::new().await;
    app.create_account("frank@example.com", "password123", false)
        .await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "frank@example.com", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"].as_str(), Some("Email not verified"));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn login_disabled_account_rejected() {
    let app = TestApp::new().await;
    let id = app
        .create_account("grace@example.com", "password123", true)
        .await;
    sqlx::query("UPDATE accounts SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "grace@example.com", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"].as_str(), Some("Account is disabled"));

    // Account state wins over the password check: even a wrong password
    // reports the disabled state.
    let wrong_password = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "grace@example.com", "password": "wrongpassword" })),
            None,
        )
        .await;
    assert_eq!(
        wrong_password.body["message"].as_str(),
        Some("Account is disabled")
    );
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn every_login_outcome_lands_in_attempt_ledger() {
    let app = TestApp::new().await;
    app.create_account("heidi@example.com", "password123", true)
        .await;
    app.create_account("uma@example.com", "password123", false)
        .await;
    let disabled = app
        .create_account("vic@example.com", "password123", true)
        .await;
    sqlx::query("UPDATE accounts SET is_active = FALSE WHERE id = $1")
        .bind(disabled)
        .execute(&app.db_pool)
        .await
        .unwrap();

    // Five outcomes: nonexistent email, wrong password, disabled,
    // unverified, success. Each leaves exactly one ledger row.
    let attempts = [
        ("ghost@example.com", "password123", false),
        ("heidi@example.com", "wrongpassword", false),
        ("vic@example.com", "password123", false),
        ("uma@example.com", "password123", false),
        ("heidi@example.com", "password123", true),
    ];
    for (email, password, _) in &attempts {
        app.request(
            "POST",
            "/auth/login",
            Some(json!({ "email": email, "password": password })),
            None,
        )
        .await;
    }

    let rows: Vec<(String, bool)> = sqlx::query_as(
        "SELECT email, success FROM login_attempts ORDER BY created_at",
    )
    .fetch_all(&app.db_pool)
    .await
    .unwrap();

    let expected: Vec<(String, bool)> = attempts
        .iter()
        .map(|(email, _, success)| (email.to_string(), *success))
        .collect();
    assert_eq!(rows, expected);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn verify_email_consumes_token() {
    let app = TestApp::new().await;
    app.request(
        "POST",
        "/auth/register",
        Some(json!({ "email": "ivan@example.com", "password": "password123" })),
        None,
    )
    .await;

    let token: String =
        sqlx::query_scalar("SELECT token FROM email_verifications LIMIT 1")
            .fetch_one(&app.db_pool)
            .await
            .unwrap();

    let response = app
        .request("GET", &format!("/auth/verify-email?token={token}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let verified: bool =
        sqlx::query_scalar("SELECT email_verified FROM accounts WHERE email = $1")
            .bind("ivan@example.com")
            .fetch_one(&app.db_pool)
            .await
            .unwrap();
    assert!(verified);

    // Single use; a spent or unknown token is a validation failure.
    let replay = app
        .request("GET", &format!("/auth/verify-email?token={token}"), None, None)
        .await;
    assert_eq!(replay.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn resend_verification_is_uniform_for_unknown_email() {
    let app = TestApp::new().await;
    app.create_account("judy@example.com", "password123", false)
        .await;

    let known = app
        .request(
            "POST",
            "/auth/resend-verification",
            Some(json!({ "email": "judy@example.com" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/auth/resend-verification",
            Some(json!({ "email": "nobody@example.com" })),
            None,
        )
        .await;

    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(known.body["message"], unknown.body["message"]);

    // Only the known, unverified account got a token.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_verifications")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn password_reset_flow_revokes_sessions() {
    let app = TestApp::new().await;
    app.create_account("kim@example.com", "oldpassword1", true)
        .await;
    let (_, refresh) = app.login("kim@example.com", "oldpassword1").await;

    let response = app
        .request(
            "POST",
            "/auth/password-reset",
            Some(json!({ "email": "kim@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let token: String = sqlx::query_scalar("SELECT token FROM password_resets LIMIT 1")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();

    let confirm = app
        .request(
            "POST",
            "/auth/password-reset/confirm",
            Some(json!({ "token": token, "password": "newpassword1" })),
            None,
        )
        .await;
    assert_eq!(confirm.status, StatusCode::OK, "{:?}", confirm.body);

    // Old sessions are dead, old password no longer works, new one does.
    let stale = app
        .request_with_cookie("POST", "/auth/refresh", None, None, Some(&refresh))
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let old_login = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "kim@example.com", "password": "oldpassword1" })),
            None,
        )
        .await;
    assert_eq!(old_login.status, StatusCode::UNAUTHORIZED);

    app.login("kim@example.com", "newpassword1").await;

    // The reset token is single-use.
    let replay = app
        .request(
            "POST",
            "/auth/password-reset/confirm",
            Some(json!({ "token": token, "password": "anotherpassword1" })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn password_reset_is_uniform_for_unknown_email() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/auth/password-reset",
            Some(json!({ "email": "nobody@example.com" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn password_reset_skips_federation_only_accounts() {
    let app = TestApp::new().await;
    sqlx::query(
        r#"INSERT INTO accounts (email, password_hash, email_verified, federated_id)
           VALUES ($1, NULL, TRUE, $2)"#,
    )
    .bind("sam@example.com")
    .bind("provider-sub-sam")
    .execute(&app.db_pool)
    .await
    .unwrap();

    let response = app
        .request(
            "POST",
            "/auth/password-reset",
            Some(json!({ "email": "sam@example.com" })),
            None,
        )
        .await;

    // Uniform success, but no token and no mail job: there is no
    // password to reset.
    assert_eq!(response.status, StatusCode::OK);
    let resets: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM password_resets")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(resets, 0);
    let jobs: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM outbox_jobs WHERE job_type = 'send_reset_email'",
    )
    .fetch_one(&app.db_pool)
    .await
    .unwrap();
    assert_eq!(jobs, 0);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn federation_login_marks_email_verified() {
    let app = TestApp::new().await;
    // An account already linked to the provider but never verified
    // locally.
    sqlx::query(
        r#"INSERT INTO accounts (email, password_hash, email_verified, federated_id)
           VALUES ($1, NULL, FALSE, $2)"#,
    )
    .bind("tess@example.com")
    .bind("provider-sub-tess")
    .execute(&app.db_pool)
    .await
    .unwrap();

    let identity = FederatedIdentity {
        subject: "provider-sub-tess".to_string(),
        email: "tess@example.com".to_string(),
        display_name: None,
    };
    let session = app
        .session_authority
        .login_with_federation(&identity, "192.0.2.7")
        .await
        .unwrap();

    // The provider assertion stamps the email verified.
    assert!(session.account.email_verified);
    let verified: bool =
        sqlx::query_scalar("SELECT email_verified FROM accounts WHERE email = $1")
            .bind("tess@example.com")
            .fetch_one(&app.db_pool)
            .await
            .unwrap();
    assert!(verified);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn me_returns_profile_with_roles() {
    let app = TestApp::new().await;
    let id = app
        .create_account("leo@example.com", "password123", true)
        .await;
    app.grant_role(id, "user").await;
    let (access, _) = app.login("leo@example.com", "password123").await;

    let response = app.request("GET", "/auth/me", None, Some(&access)).await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["email"].as_str(), Some("leo@example.com"));
    assert_eq!(
        response.body["roles"].as_array().map(|r| r.len()),
        Some(1)
    );
    assert!(response.body.get("permissions").is_some());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn me_requires_valid_token() {
    let app = TestApp::new().await;

    let missing = app.request("GET", "/auth/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app.request("GET", "/auth/me", None, Some("not-a-jwt")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn federation_start_disabled_returns_not_found() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/auth/azure", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
