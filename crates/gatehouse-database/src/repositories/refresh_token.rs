//! Refresh-token repository implementation.

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::token::RefreshToken;

/// Repository for refresh-token rows.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh-token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new refresh token inside an open transaction.
    pub async fn create_tx(
        &self,
        conn: &mut PgConnection,
        account_id: Uuid,
        token: &str,
        ttl: Duration,
    ) -> AppResult<RefreshToken> {
        sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens (account_id, token, expires_at) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(account_id)
        .bind(token)
        .bind(Utc::now() + ttl)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create refresh token", e)
        })
    }

    /// Find a usable token by its secret value: not revoked, not expired.
    ///
    /// Not-found, expired, and revoked are indistinguishable to the
    /// caller by design.
    pub async fn find_usable(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens \
             WHERE token = $1 AND revoked = FALSE AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to look up refresh token", e)
        })
    }

    /// Stamp `last_used_at` on a token. The secret itself is never rotated.
    pub async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE refresh_tokens SET last_used_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to stamp last_used_at", e)
            })?;
        Ok(())
    }

    /// Revoke a token by secret value. Revoking a nonexistent or
    /// already-revoked token succeeds silently.
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to revoke refresh token", e)
            })?;
        Ok(())
    }

    /// Revoke every token belonging to an account inside an open
    /// transaction (force logout everywhere).
    pub async fn revoke_all_tx(&self, conn: &mut PgConnection, account_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE account_id = $1 AND revoked = FALSE",
        )
        .bind(account_id)
        .execute(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke account tokens", e)
        })?;
        Ok(result.rows_affected())
    }

    /// Delete all rows past expiry, regardless of revocation state.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired tokens", e)
            })?;
        Ok(result.rows_affected())
    }
}
