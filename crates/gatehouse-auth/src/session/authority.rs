//! The session authority — registration, login, refresh, and recovery flows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};

use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::config::worker::WorkerConfig;
use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_database::repositories::{
    AccountRepository, LoginAttemptRepository, OutboxRepository,
};
use gatehouse_entity::account::{Account, CreateAccount};
use gatehouse_entity::outbox::job_type;

use crate::federation::FederatedIdentity;
use crate::jwt::JwtEncoder;
use crate::password::{PasswordHasher, PasswordPolicy};
use crate::token::TokenService;

/// A fully established session: the account plus both credentials.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated account.
    pub account: Account,
    /// Signed access token.
    pub access_token: String,
    /// Access-token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// Opaque refresh secret.
    pub refresh_token: String,
}

/// Why a login was refused, before masking.
///
/// Only the variants that leak nothing useful to an attacker keep a
/// distinct message at the boundary; unknown-account and bad-password
/// collapse into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginFailure {
    UnknownAccount,
    BadPassword,
    NoLocalPassword,
    Disabled,
    Unverified,
}

impl LoginFailure {
    fn into_error(self) -> AppError {
        match self {
            Self::Disabled => AppError::authentication("Account is disabled"),
            Self::Unverified => AppError::authentication("Email not verified"),
            Self::UnknownAccount | Self::BadPassword | Self::NoLocalPassword => {
                AppError::authentication("Invalid credentials")
            }
        }
    }
}

/// Orchestrates the account and session lifecycle.
///
/// Grouped mutations (registration, login bookkeeping, password reset,
/// federation provisioning) run inside explicit transactions; follow-up
/// work that must survive a crash — default-role assignment, outbound
/// mail — is enqueued as outbox jobs within the same transaction and
/// delivered by the background runner after commit.
pub struct SessionAuthority {
    /// Connection pool; transactions are opened here.
    pool: PgPool,
    /// Account persistence.
    account_repo: Arc<AccountRepository>,
    /// Login-attempt ledger.
    attempt_repo: Arc<LoginAttemptRepository>,
    /// Durable post-commit jobs.
    outbox_repo: Arc<OutboxRepository>,
    /// Opaque-token lifecycle.
    token_service: Arc<TokenService>,
    /// Access-token signing.
    jwt_encoder: Arc<JwtEncoder>,
    /// Argon2id hashing.
    hasher: PasswordHasher,
    /// Password strength policy.
    policy: PasswordPolicy,
    /// Delivery attempts granted to enqueued jobs.
    max_job_attempts: i32,
}

impl std::fmt::Debug for SessionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthority")
            .field("max_job_attempts", &self.max_job_attempts)
            .finish()
    }
}

impl SessionAuthority {
    /// Creates a new session authority.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        account_repo: Arc<AccountRepository>,
        attempt_repo: Arc<LoginAttemptRepository>,
        outbox_repo: Arc<OutboxRepository>,
        token_service: Arc<TokenService>,
        jwt_encoder: Arc<JwtEncoder>,
        auth_config: &AuthConfig,
        worker_config: &WorkerConfig,
    ) -> Self {
        Self {
            pool,
            account_repo,
            attempt_repo,
            outbox_repo,
            token_service,
            jwt_encoder,
            hasher: PasswordHasher::new(),
            policy: PasswordPolicy::new(auth_config),
            max_job_attempts: worker_config.max_job_attempts,
        }
    }

    /// Registers a new account.
    ///
    /// The account row, its verification token, the default-role job,
    /// and the verification-email job all commit atomically. Whether
    /// this is the first-ever account (and therefore gets the admin
    /// role) is decided inside the same transaction.
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let email = normalize_email(email);
        self.policy.validate(password)?;
        let password_hash = self.hasher.hash_password(password)?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let is_first_account = self.account_repo.count_tx(&mut tx).await? == 0;

        let account = self
            .account_repo
            .create_tx(
                &mut tx,
                &CreateAccount {
                    email: email.clone(),
                    password_hash: Some(password_hash),
                    email_verified: false,
                    federated_id: None,
                },
            )
            .await?;

        let verification_token = self
            .token_service
            .issue_verification(&mut tx, account.id)
            .await?;

        self.outbox_repo
            .enqueue_tx(
                &mut tx,
                job_type::ASSIGN_DEFAULT_ROLE,
                json!({ "account_id": account.id, "grant_admin": is_first_account }),
                self.max_job_attempts,
            )
            .await?;
        self.outbox_repo
            .enqueue_tx(
                &mut tx,
                job_type::SEND_VERIFICATION_EMAIL,
                json!({ "email": email, "token": verification_token }),
                self.max_job_attempts,
            )
            .await?;

        tx.commit().await.map_err(db_err)?;

        info!(account_id = %account.id, first_account = is_first_account, "Account registered");
        Ok(account)
    }

    /// Authenticates with email and password and establishes a session.
    ///
    /// Every outcome, success or failure, lands in the login-attempt
    /// ledger. Failure reasons are masked: unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: &str,
    ) -> Result<AuthSession, AppError> {
        let email = normalize_email(email);

        let failure = match self.check_credentials(&email, password).await? {
            Ok(account) => return self.establish_session(account, &email, ip_address).await,
            Err(failure) => failure,
        };

        // Failed attempts are recorded outside any transaction so the
        // ledger row survives regardless of what else happens.
        if let Err(e) = self.attempt_repo.record(&email, ip_address, false).await {
            warn!(error = %e, "Failed to record login attempt");
        }
        warn!(email = %email, reason = ?failure, "Login refused");
        Err(failure.into_error())
    }

    /// Verifies the password against the stored account, classifying
    /// any refusal.
    async fn check_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Result<Account, LoginFailure>, AppError> {
        let Some(account) = self.account_repo.find_by_email(email).await? else {
            return Ok(Err(LoginFailure::UnknownAccount));
        };

        // Account state is checked before the password so a disabled or
        // unverified account reports its state even on a wrong password.
        if !account.is_active {
            return Ok(Err(LoginFailure::Disabled));
        }
        if !account.email_verified {
            return Ok(Err(LoginFailure::Unverified));
        }

        let Some(hash) = account.password_hash.as_deref() else {
            return Ok(Err(LoginFailure::NoLocalPassword));
        };

        if !self.hasher.verify_password(password, hash)? {
            return Ok(Err(LoginFailure::BadPassword));
        }

        Ok(Ok(account))
    }

    /// Authenticates via a verified identity-provider assertion.
    ///
    /// Resolution is three-way inside one transaction: an account
    /// already linked to this subject wins; otherwise an account with
    /// the same email is linked in place; otherwise a fresh
    /// federation-only account is provisioned, pre-verified.
    pub async fn login_with_federation(
        &self,
        identity: &FederatedIdentity,
        ip_address: &str,
    ) -> Result<AuthSession, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let account = match self
            .account_repo
            .find_by_federated_id_tx(&mut tx, &identity.subject)
            .await?
        {
            // The provider assertion proves control of the mailbox, so
            // the returning account is stamped verified even if it never
            // followed a verification link.
            Some(account) => {
                self.account_repo
                    .set_email_verified_tx(&mut tx, account.id)
                    .await?
            }
            None => match self
                .account_repo
                .find_by_email_tx(&mut tx, &identity.email)
                .await?
            {
                Some(existing) => {
                    info!(account_id = %existing.id, "Linking federated identity to existing account");
                    self.account_repo
                        .link_federated_id_tx(&mut tx, existing.id, &identity.subject)
                        .await?
                }
                None => {
                    let is_first_account = self.account_repo.count_tx(&mut tx).await? == 0;
                    let account = self
                        .account_repo
                        .create_tx(
                            &mut tx,
                            &CreateAccount {
                                email: identity.email.clone(),
                                password_hash: None,
                                email_verified: true,
                                federated_id: Some(identity.subject.clone()),
                            },
                        )
                        .await?;
                    self.outbox_repo
                        .enqueue_tx(
                            &mut tx,
                            job_type::ASSIGN_DEFAULT_ROLE,
                            json!({ "account_id": account.id, "grant_admin": is_first_account }),
                            self.max_job_attempts,
                        )
                        .await?;
                    info!(account_id = %account.id, "Provisioned federated account");
                    account
                }
            },
        };

        if !account.is_active {
            tx.rollback().await.map_err(db_err)?;
            if let Err(e) = self
                .attempt_repo
                .record(&account.email, ip_address, false)
                .await
            {
                warn!(error = %e, "Failed to record login attempt");
            }
            return Err(AppError::authentication("Account is disabled"));
        }

        let email = account.email.clone();
        self.finish_login_tx(tx, account, &email, ip_address).await
    }

    /// Writes the success-path bookkeeping and issues both tokens.
    async fn establish_session(
        &self,
        account: Account,
        email: &str,
        ip_address: &str,
    ) -> Result<AuthSession, AppError> {
        let tx = self.pool.begin().await.map_err(db_err)?;
        self.finish_login_tx(tx, account, email, ip_address).await
    }

    /// Completes a login inside an already-open transaction: attempt
    /// row, last-login stamp, refresh issuance, then the access token
    /// after commit.
    async fn finish_login_tx(
        &self,
        mut tx: sqlx::Transaction<'_, sqlx::Postgres>,
        account: Account,
        email: &str,
        ip_address: &str,
    ) -> Result<AuthSession, AppError> {
        self.attempt_repo
            .record_tx(&mut tx, email, ip_address, true)
            .await?;
        self.account_repo
            .touch_last_login_tx(&mut tx, account.id, Utc::now())
            .await?;
        let refresh = self.token_service.issue_refresh(&mut tx, account.id).await?;
        tx.commit().await.map_err(db_err)?;

        let (access_token, access_expires_at) = self
            .jwt_encoder
            .generate_access_token(account.id, &account.email)?;

        info!(account_id = %account.id, "Login successful");
        Ok(AuthSession {
            account,
            access_token,
            access_expires_at,
            refresh_token: refresh.token,
        })
    }

    /// Exchanges a refresh token for a fresh access token.
    ///
    /// The refresh secret is returned unchanged; refresh tokens are not
    /// rotated on use.
    pub async fn refresh_access(&self, refresh_secret: &str) -> Result<AuthSession, AppError> {
        let refresh = self.token_service.validate_refresh(refresh_secret).await?;

        let account = self
            .account_repo
            .find_by_id(refresh.account_id)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid or expired refresh token"))?;

        if !account.is_active {
            return Err(AppError::authentication("Account is disabled"));
        }

        let (access_token, access_expires_at) = self
            .jwt_encoder
            .generate_access_token(account.id, &account.email)?;

        Ok(AuthSession {
            account,
            access_token,
            access_expires_at,
            refresh_token: refresh.token,
        })
    }

    /// Ends the session holding this refresh token. Idempotent.
    pub async fn logout(&self, refresh_secret: &str) -> Result<(), AppError> {
        self.token_service.revoke_refresh(refresh_secret).await
    }

    /// Consumes an email-verification token and marks the account
    /// verified.
    pub async fn verify_email(&self, token: &str) -> Result<(), AppError> {
        let account_id = self
            .token_service
            .consume_verification(token)
            .await?
            .ok_or_else(|| AppError::validation("Invalid or expired verification token"))?;

        self.account_repo.set_email_verified(account_id).await?;
        info!(account_id = %account_id, "Email verified");
        Ok(())
    }

    /// Issues a fresh verification token and queues its email.
    ///
    /// Unknown and already-verified emails succeed silently so the
    /// endpoint cannot be used to probe for accounts.
    pub async fn resend_verification(&self, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email);

        let Some(account) = self.account_repo.find_by_email(&email).await? else {
            return Ok(());
        };
        if account.email_verified {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let token = self
            .token_service
            .issue_verification(&mut tx, account.id)
            .await?;
        self.outbox_repo
            .enqueue_tx(
                &mut tx,
                job_type::SEND_VERIFICATION_EMAIL,
                json!({ "email": email, "token": token }),
                self.max_job_attempts,
            )
            .await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    /// Issues a password-reset token and queues its email.
    ///
    /// Unknown emails succeed silently for the same anti-enumeration
    /// reason as [`resend_verification`](Self::resend_verification).
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email);

        let Some(account) = self.account_repo.find_by_email(&email).await? else {
            return Ok(());
        };

        // Federation-only accounts have no password to reset; succeed
        // silently without issuing a token.
        if account.password_hash.is_none() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let token = self.token_service.issue_reset(&mut tx, account.id).await?;
        self.outbox_repo
            .enqueue_tx(
                &mut tx,
                job_type::SEND_RESET_EMAIL,
                json!({ "email": email, "token": token }),
                self.max_job_attempts,
            )
            .await?;
        tx.commit().await.map_err(db_err)?;

        info!(account_id = %account.id, "Password reset requested");
        Ok(())
    }

    /// Spends a reset token and replaces the password.
    ///
    /// The password swap, the token's spent flag, and the revocation of
    /// every outstanding refresh token commit together.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        self.policy.validate(new_password)?;
        let reset = self.token_service.validate_reset(token).await?;
        let password_hash = self.hasher.hash_password(new_password)?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;
        self.account_repo
            .update_password_tx(&mut tx, reset.account_id, &password_hash)
            .await?;
        self.token_service.mark_reset_used(&mut tx, token).await?;
        self.token_service
            .revoke_all(&mut tx, reset.account_id)
            .await?;
        tx.commit().await.map_err(db_err)?;

        info!(account_id = %reset.account_id, "Password reset completed");
        Ok(())
    }
}

/// Lowercases and trims an email for storage and lookup.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Transaction failed", e)
}
