//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_entity::account::Account;
use gatehouse_entity::attempt::LoginAttempt;

/// Account summary for responses. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Whether the email has been verified.
    pub email_verified: bool,
    /// Whether the account is linked to the identity provider.
    pub federated: bool,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last successful login.
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            email_verified: account.email_verified,
            federated: account.federated_id.is_some(),
            is_active: account.is_active,
            created_at: account.created_at,
            last_login: account.last_login,
        }
    }
}

/// Login and refresh response. The refresh token itself travels in the
/// HTTP-only cookie, never in this body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Signed access token.
    pub access_token: String,
    /// Access-token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// The authenticated account.
    pub account: AccountResponse,
}

/// Registration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Confirmation message.
    pub message: String,
    /// The created account.
    pub account: AccountResponse,
}

/// Profile response for GET /auth/me.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// The account.
    #[serde(flatten)]
    pub account: AccountResponse,
    /// Role names held by the account.
    pub roles: Vec<String>,
    /// Permission names held through those roles.
    pub permissions: Vec<String>,
}

/// Federation login initiation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationUrlResponse {
    /// Provider authorization URL to redirect the user to.
    pub auth_url: String,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Paginated listing wrapper for the admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// Items in this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: i64,
    /// Page size.
    pub per_page: i64,
}

/// Login-attempt row for the admin ledger listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttemptResponse {
    /// Row ID.
    pub id: Uuid,
    /// Target email.
    pub email: String,
    /// Source IP.
    pub ip_address: String,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// When the attempt happened.
    pub created_at: DateTime<Utc>,
}

impl From<&LoginAttempt> for LoginAttemptResponse {
    fn from(attempt: &LoginAttempt) -> Self {
        Self {
            id: attempt.id,
            email: attempt.email.clone(),
            ip_address: attempt.ip_address.clone(),
            success: attempt.success,
            created_at: attempt.created_at,
        }
    }
}

/// Health probe response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status string, `"ok"` when healthy.
    pub status: String,
}
