//! Token and password configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
///
/// Access tokens are RS256-signed; the PEM key material is supplied
/// inline (usually via environment variables) so no key files need to
/// ship with the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// RSA private key (PEM) for access-token signing.
    #[serde(default)]
    pub jwt_private_key: String,
    /// RSA public key (PEM) for access-token verification.
    #[serde(default)]
    pub jwt_public_key: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Email-verification token TTL in hours.
    #[serde(default = "default_verification_ttl")]
    pub verification_ttl_hours: u64,
    /// Password-reset token TTL in hours.
    #[serde(default = "default_reset_ttl")]
    pub reset_ttl_hours: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key: String::new(),
            jwt_public_key: String::new(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            verification_ttl_hours: default_verification_ttl(),
            reset_ttl_hours: default_reset_ttl(),
            password_min_length: default_password_min(),
        }
    }
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_verification_ttl() -> u64 {
    24
}

fn default_reset_ttl() -> u64 {
    1
}

fn default_password_min() -> usize {
    8
}
