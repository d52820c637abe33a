//! Login-attempt ledger repository implementation.

use chrono::{Duration, Utc};
use sqlx::{PgConnection, PgPool};

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::attempt::LoginAttempt;

/// Repository for the append-only login-attempt ledger.
#[derive(Debug, Clone)]
pub struct LoginAttemptRepository {
    pool: PgPool,
}

impl LoginAttemptRepository {
    /// Create a new login-attempt repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an attempt row.
    pub async fn record(&self, email: &str, ip_address: &str, success: bool) -> AppResult<()> {
        sqlx::query("INSERT INTO login_attempts (email, ip_address, success) VALUES ($1, $2, $3)")
            .bind(email)
            .bind(ip_address)
            .bind(success)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to record login attempt", e)
            })?;
        Ok(())
    }

    /// Append an attempt row inside an open transaction (success path,
    /// grouped with the last-login stamp and token issuance).
    pub async fn record_tx(
        &self,
        conn: &mut PgConnection,
        email: &str,
        ip_address: &str,
        success: bool,
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO login_attempts (email, ip_address, success) VALUES ($1, $2, $3)")
            .bind(email)
            .bind(ip_address)
            .bind(success)
            .execute(conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to record login attempt", e)
            })?;
        Ok(())
    }

    /// Count failed attempts for an email within the trailing window.
    pub async fn count_recent_failures(&self, email: &str, window: Duration) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM login_attempts \
             WHERE email = $1 AND success = FALSE AND created_at > $2",
        )
        .bind(email)
        .bind(Utc::now() - window)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count failed attempts", e)
        })
    }

    /// List attempts, newest first, for the administrative interface.
    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<LoginAttempt>> {
        sqlx::query_as::<_, LoginAttempt>(
            "SELECT * FROM login_attempts ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list login attempts", e)
        })
    }
}
