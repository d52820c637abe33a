//! Email-verification token repository implementation.

use chrono::{Duration, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::token::EmailVerificationToken;

/// Repository for email-verification token rows.
#[derive(Debug, Clone)]
pub struct VerificationRepository {
    pool: PgPool,
}

impl VerificationRepository {
    /// Create a new verification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new verification token inside an open transaction.
    pub async fn create_tx(
        &self,
        conn: &mut PgConnection,
        account_id: Uuid,
        token: &str,
        ttl: Duration,
    ) -> AppResult<EmailVerificationToken> {
        sqlx::query_as::<_, EmailVerificationToken>(
            "INSERT INTO email_verifications (account_id, token, expires_at) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(account_id)
        .bind(token)
        .bind(Utc::now() + ttl)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create verification token", e)
        })
    }

    /// Atomically consume an unexpired token, deleting the row and
    /// returning the owning account id. Returns `None` when the token is
    /// unknown, expired, or was already consumed.
    pub async fn consume(&self, token: &str) -> AppResult<Option<Uuid>> {
        sqlx::query_scalar(
            "DELETE FROM email_verifications \
             WHERE token = $1 AND expires_at > NOW() \
             RETURNING account_id",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to consume verification token", e)
        })
    }

    /// Delete all rows past expiry.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM email_verifications WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to delete expired verifications",
                    e,
                )
            })?;
        Ok(result.rows_affected())
    }
}
