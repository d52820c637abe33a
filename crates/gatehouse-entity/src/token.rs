//! Server-side token entity models.
//!
//! Three distinct token tables exist with different single-use semantics:
//! refresh tokens are revoked by flag and never rotated, verification
//! tokens are deleted on consumption, and reset tokens keep their row
//! with a `used` flag for audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A long-lived opaque refresh token, one row per active session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// Row identifier.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// The opaque secret value presented by clients.
    #[serde(skip_serializing)]
    pub token: String,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// Expiry instant; the token is unusable past this.
    pub expires_at: DateTime<Utc>,
    /// Irreversible revocation flag.
    pub revoked: bool,
    /// Last time the token was exchanged for an access token.
    pub last_used_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// A token is usable iff it is not revoked and not expired.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }
}

/// A single-use email-verification token; consuming it deletes the row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailVerificationToken {
    /// Row identifier.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// The opaque secret value.
    #[serde(skip_serializing)]
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// A single-use password-reset token; the row is retained with a `used`
/// flag for audit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetToken {
    /// Row identifier.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// The opaque secret value.
    #[serde(skip_serializing)]
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Whether the token has already been spent.
    pub used: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn refresh(revoked: bool, expires_in: Duration) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            token: Uuid::new_v4().to_string(),
            issued_at: Utc::now(),
            expires_at: Utc::now() + expires_in,
            revoked,
            last_used_at: None,
        }
    }

    #[test]
    fn test_refresh_usability() {
        let now = Utc::now();
        assert!(refresh(false, Duration::days(7)).is_usable(now));
        assert!(!refresh(true, Duration::days(7)).is_usable(now));
        assert!(!refresh(false, Duration::seconds(-1)).is_usable(now));
    }
}
