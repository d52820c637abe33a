//! Per-type outbox job handlers.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use gatehouse_auth::email::EmailService;
use gatehouse_auth::rbac::RoleAuthority;
use gatehouse_core::error::AppError;
use gatehouse_entity::outbox::{OutboxJob, job_type};

/// The role granted to every fresh account.
pub const DEFAULT_ROLE: &str = "user";
/// The role additionally granted to the first-ever account.
pub const ADMIN_ROLE: &str = "admin";

/// Payload of an `assign_default_role` job.
#[derive(Debug, Deserialize)]
struct AssignRolePayload {
    account_id: Uuid,
    #[serde(default)]
    grant_admin: bool,
}

/// Payload of the email delivery jobs.
#[derive(Debug, Deserialize)]
struct EmailPayload {
    email: String,
    token: String,
}

/// Dispatches claimed outbox jobs to their handlers.
pub struct JobHandlers {
    /// Role assignment.
    roles: Arc<RoleAuthority>,
    /// Outbound mail.
    email: Arc<EmailService>,
}

impl std::fmt::Debug for JobHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHandlers").finish()
    }
}

impl JobHandlers {
    /// Creates the handler set.
    pub fn new(roles: Arc<RoleAuthority>, email: Arc<EmailService>) -> Self {
        Self { roles, email }
    }

    /// Executes a single claimed job.
    pub async fn handle(&self, job: &OutboxJob) -> Result<(), AppError> {
        match job.job_type.as_str() {
            job_type::ASSIGN_DEFAULT_ROLE => self.assign_default_role(job).await,
            job_type::SEND_VERIFICATION_EMAIL => self.send_verification_email(job).await,
            job_type::SEND_RESET_EMAIL => self.send_reset_email(job).await,
            other => Err(AppError::internal(format!("Unknown job type '{other}'"))),
        }
    }

    /// Grants the default role to a fresh account, plus the admin role
    /// when the registration transaction decided this was the first
    /// account. Role assignment is idempotent, so a retried job is safe.
    async fn assign_default_role(&self, job: &OutboxJob) -> Result<(), AppError> {
        let payload: AssignRolePayload = serde_json::from_value(job.payload.clone())?;

        self.roles
            .assign_role(payload.account_id, DEFAULT_ROLE)
            .await?;
        if payload.grant_admin {
            self.roles
                .assign_role(payload.account_id, ADMIN_ROLE)
                .await?;
            info!(account_id = %payload.account_id, "First account granted admin role");
        }
        Ok(())
    }

    async fn send_verification_email(&self, job: &OutboxJob) -> Result<(), AppError> {
        let payload: EmailPayload = serde_json::from_value(job.payload.clone())?;
        self.email
            .send_verification_email(&payload.email, &payload.token)
            .await
    }

    async fn send_reset_email(&self, job: &OutboxJob) -> Result<(), AppError> {
        let payload: EmailPayload = serde_json::from_value(job.payload.clone())?;
        self.email
            .send_reset_email(&payload.email, &payload.token)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_role_payload_shape() {
        let payload: AssignRolePayload = serde_json::from_value(serde_json::json!({
            "account_id": "7b63a6a1-0b1a-4d2c-9be8-2f1a6a9d4e10",
            "grant_admin": true,
        }))
        .unwrap();
        assert!(payload.grant_admin);
    }

    #[test]
    fn test_grant_admin_defaults_to_false() {
        let payload: AssignRolePayload = serde_json::from_value(serde_json::json!({
            "account_id": "7b63a6a1-0b1a-4d2c-9be8-2f1a6a9d4e10",
        }))
        .unwrap();
        assert!(!payload.grant_admin);
    }
}
