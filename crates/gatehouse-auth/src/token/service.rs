//! Lifecycle service for opaque server-side tokens.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::PgConnection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_database::repositories::{
    PasswordResetRepository, RefreshTokenRepository, VerificationRepository,
};
use gatehouse_entity::token::{PasswordResetToken, RefreshToken};

/// Manages opaque refresh, verification, and reset tokens.
///
/// All three kinds are random UUID strings; none of them carry claims
/// and none can be validated offline. Refresh tokens are long-lived and
/// revocable, verification tokens are consumed by deletion, and reset
/// tokens are single-use via a spent flag.
#[derive(Clone)]
pub struct TokenService {
    /// Refresh-token persistence.
    refresh_repo: Arc<RefreshTokenRepository>,
    /// Email-verification token persistence.
    verification_repo: Arc<VerificationRepository>,
    /// Password-reset token persistence.
    reset_repo: Arc<PasswordResetRepository>,
    /// Refresh token TTL.
    refresh_ttl: Duration,
    /// Verification token TTL.
    verification_ttl: Duration,
    /// Reset token TTL.
    reset_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("refresh_ttl", &self.refresh_ttl)
            .field("verification_ttl", &self.verification_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .finish()
    }
}

impl TokenService {
    /// Creates a new token service.
    pub fn new(
        refresh_repo: Arc<RefreshTokenRepository>,
        verification_repo: Arc<VerificationRepository>,
        reset_repo: Arc<PasswordResetRepository>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            refresh_repo,
            verification_repo,
            reset_repo,
            refresh_ttl: Duration::days(config.refresh_ttl_days as i64),
            verification_ttl: Duration::hours(config.verification_ttl_hours as i64),
            reset_ttl: Duration::hours(config.reset_ttl_hours as i64),
        }
    }

    /// Issues a new refresh token for an account inside an open
    /// transaction. The secret is a random UUID; the token is never
    /// rotated on use.
    pub async fn issue_refresh(
        &self,
        conn: &mut PgConnection,
        account_id: Uuid,
    ) -> Result<RefreshToken, AppError> {
        let secret = Uuid::new_v4().to_string();
        let token = self
            .refresh_repo
            .create_tx(conn, account_id, &secret, self.refresh_ttl)
            .await?;
        debug!(account_id = %account_id, "Issued refresh token");
        Ok(token)
    }

    /// Validates a presented refresh token and stamps its usage time.
    ///
    /// Unknown, expired, and revoked tokens all produce the same
    /// authentication error.
    pub async fn validate_refresh(&self, secret: &str) -> Result<RefreshToken, AppError> {
        let token = self
            .refresh_repo
            .find_usable(secret)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid or expired refresh token"))?;

        // Usage stamping is bookkeeping; a failure here must not fail
        // the refresh itself.
        if let Err(e) = self.refresh_repo.touch_last_used(token.id, Utc::now()).await {
            warn!(token_id = %token.id, error = %e, "Failed to stamp refresh token usage");
        }

        Ok(token)
    }

    /// Revokes a refresh token by secret value. Idempotent: revoking an
    /// unknown or already-revoked token succeeds.
    pub async fn revoke_refresh(&self, secret: &str) -> Result<(), AppError> {
        self.refresh_repo.revoke(secret).await
    }

    /// Revokes every refresh token for an account inside an open
    /// transaction.
    pub async fn revoke_all(
        &self,
        conn: &mut PgConnection,
        account_id: Uuid,
    ) -> Result<u64, AppError> {
        let revoked = self.refresh_repo.revoke_all_tx(conn, account_id).await?;
        if revoked > 0 {
            info!(account_id = %account_id, revoked, "Revoked all refresh tokens");
        }
        Ok(revoked)
    }

    /// Issues an email-verification token inside an open transaction,
    /// returning the raw secret for the verification link.
    pub async fn issue_verification(
        &self,
        conn: &mut PgConnection,
        account_id: Uuid,
    ) -> Result<String, AppError> {
        let secret = Uuid::new_v4().to_string();
        self.verification_repo
            .create_tx(conn, account_id, &secret, self.verification_ttl)
            .await?;
        Ok(secret)
    }

    /// Consumes a verification token, returning the owning account id.
    /// The row is deleted; replay finds nothing.
    pub async fn consume_verification(&self, secret: &str) -> Result<Option<Uuid>, AppError> {
        self.verification_repo.consume(secret).await
    }

    /// Issues a password-reset token inside an open transaction,
    /// returning the raw secret for the reset link.
    pub async fn issue_reset(
        &self,
        conn: &mut PgConnection,
        account_id: Uuid,
    ) -> Result<String, AppError> {
        let secret = Uuid::new_v4().to_string();
        self.reset_repo
            .create_tx(conn, account_id, &secret, self.reset_ttl)
            .await?;
        Ok(secret)
    }

    /// Looks up a spendable reset token without consuming it.
    pub async fn validate_reset(&self, secret: &str) -> Result<PasswordResetToken, AppError> {
        self.reset_repo
            .find_usable(secret)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid or expired reset token"))
    }

    /// Marks a reset token spent inside an open transaction.
    pub async fn mark_reset_used(
        &self,
        conn: &mut PgConnection,
        secret: &str,
    ) -> Result<(), AppError> {
        self.reset_repo.mark_used_tx(conn, secret).await
    }

    /// Deletes every expired token row across all three tables.
    ///
    /// Each table is swept independently; one failing sweep does not
    /// stop the others.
    pub async fn sweep_expired(&self) {
        match self.refresh_repo.delete_expired().await {
            Ok(n) if n > 0 => info!(deleted = n, "Swept expired refresh tokens"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to sweep refresh tokens"),
        }
        match self.verification_repo.delete_expired().await {
            Ok(n) if n > 0 => info!(deleted = n, "Swept expired verification tokens"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to sweep verification tokens"),
        }
        match self.reset_repo.delete_expired().await {
            Ok(n) if n > 0 => info!(deleted = n, "Swept expired reset tokens"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to sweep reset tokens"),
        }
    }
}
