//! Login-attempt ledger entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the append-only login-attempt ledger.
///
/// Rows are never updated; the only deletion path is the periodic
/// maintenance sweep. The ledger serves both audit review and the
/// abuse guard's per-email failure counting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginAttempt {
    /// Row identifier.
    pub id: Uuid,
    /// The email the caller attempted, whether or not it exists.
    pub email: String,
    /// Client IP the attempt came from.
    pub ip_address: String,
    /// Whether authentication succeeded.
    pub success: bool,
    /// When the attempt was recorded.
    pub created_at: DateTime<Utc>,
}
