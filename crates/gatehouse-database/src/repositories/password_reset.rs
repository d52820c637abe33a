//! Password-reset token repository implementation.

use chrono::{Duration, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::token::PasswordResetToken;

/// Repository for password-reset token rows.
///
/// Unlike verification tokens these are single-use via the `used` flag;
/// the row is retained for audit.
#[derive(Debug, Clone)]
pub struct PasswordResetRepository {
    pool: PgPool,
}

impl PasswordResetRepository {
    /// Create a new password-reset repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new reset token inside an open transaction.
    pub async fn create_tx(
        &self,
        conn: &mut PgConnection,
        account_id: Uuid,
        token: &str,
        ttl: Duration,
    ) -> AppResult<PasswordResetToken> {
        sqlx::query_as::<_, PasswordResetToken>(
            "INSERT INTO password_resets (account_id, token, expires_at) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(account_id)
        .bind(token)
        .bind(Utc::now() + ttl)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create reset token", e)
        })
    }

    /// Find a spendable token: unused and unexpired. Non-consuming.
    pub async fn find_usable(&self, token: &str) -> AppResult<Option<PasswordResetToken>> {
        sqlx::query_as::<_, PasswordResetToken>(
            "SELECT * FROM password_resets \
             WHERE token = $1 AND used = FALSE AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to look up reset token", e)
        })
    }

    /// Mark a token spent inside an open transaction, after the password
    /// mutation it authorized has been applied.
    pub async fn mark_used_tx(&self, conn: &mut PgConnection, token: &str) -> AppResult<()> {
        sqlx::query("UPDATE password_resets SET used = TRUE WHERE token = $1")
            .bind(token)
            .execute(conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to mark reset token used", e)
            })?;
        Ok(())
    }

    /// Delete all rows past expiry, spent or not.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM password_resets WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired resets", e)
            })?;
        Ok(result.rows_affected())
    }
}
