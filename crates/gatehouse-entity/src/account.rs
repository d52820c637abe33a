//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account in the Gatehouse system.
///
/// `password_hash` is nullable: accounts created through identity-provider
/// federation carry no local password at all.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Email address, unique case-insensitively.
    pub email: String,
    /// Argon2 password hash; `None` for federation-only accounts.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// Stable subject id issued by the identity provider, unique if set.
    pub federated_id: Option<String>,
    /// Whether the account may log in.
    pub is_active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    /// Whether the account was created through federation and has no
    /// local password.
    pub fn is_federation_only(&self) -> bool {
        self.password_hash.is_none()
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    /// Email address.
    pub email: String,
    /// Pre-hashed password; `None` for federated accounts.
    pub password_hash: Option<String>,
    /// Initial verification state (`true` for federated accounts).
    pub email_verified: bool,
    /// Identity-provider subject id, if federated.
    pub federated_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(password_hash: Option<String>) -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            password_hash,
            email_verified: true,
            federated_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_federation_only() {
        assert!(account(None).is_federation_only());
        assert!(!account(Some("$argon2id$...".to_string())).is_federation_only());
    }
}
