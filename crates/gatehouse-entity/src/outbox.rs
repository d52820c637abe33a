//! Outbox job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of an outbox job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "outbox_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    /// Waiting to be picked up (or retried) by the runner.
    Pending,
    /// Delivered successfully.
    Completed,
    /// Exhausted all attempts.
    Failed,
}

/// A durable post-commit job.
///
/// Jobs are enqueued inside the transaction whose effects they follow
/// (e.g. default-role assignment after registration), so a committed
/// registration always has its jobs on disk, and a rolled-back one never
/// does. The runner processes them detached from any request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OutboxJob {
    /// Row identifier.
    pub id: Uuid,
    /// Job discriminator, e.g. `"assign_default_role"`.
    pub job_type: String,
    /// Job arguments as JSON.
    pub payload: serde_json::Value,
    /// Current lifecycle state.
    pub status: OutboxStatus,
    /// Delivery attempts made so far.
    pub attempts: i32,
    /// Maximum delivery attempts before the job is marked failed.
    pub max_attempts: i32,
    /// Most recent failure message, if any.
    pub last_error: Option<String>,
    /// When the job was enqueued.
    pub created_at: DateTime<Utc>,
    /// When the job was last touched.
    pub updated_at: DateTime<Utc>,
}

/// Well-known job type names.
pub mod job_type {
    /// Assign the default role (and possibly admin) to a fresh account.
    pub const ASSIGN_DEFAULT_ROLE: &str = "assign_default_role";
    /// Deliver the email-verification link.
    pub const SEND_VERIFICATION_EMAIL: &str = "send_verification_email";
    /// Deliver the password-reset link.
    pub const SEND_RESET_EMAIL: &str = "send_reset_email";
}
