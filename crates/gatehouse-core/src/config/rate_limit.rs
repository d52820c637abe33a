//! Request throttling configuration.

use serde::{Deserialize, Serialize};

/// Abuse-guard configuration.
///
/// Two windows exist: the general/login window (15 minutes in production,
/// typically shortened to 1 minute in development overlays) and a separate
/// 1-minute window for the administrative endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Fixed window length for the general and login limiters, in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Maximum requests per IP per window on general auth endpoints.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Maximum login attempts per IP per window; also the per-email failed
    /// attempt threshold consulted in the login-attempt ledger.
    #[serde(default = "default_max_requests")]
    pub login_max_requests: u32,
    /// Fixed window length for the administrative limiter, in seconds.
    #[serde(default = "default_admin_window")]
    pub admin_window_seconds: u64,
    /// Maximum admin requests per IP per window.
    #[serde(default = "default_admin_max")]
    pub admin_max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window(),
            max_requests: default_max_requests(),
            login_max_requests: default_max_requests(),
            admin_window_seconds: default_admin_window(),
            admin_max_requests: default_admin_max(),
        }
    }
}

fn default_window() -> u64 {
    900
}

fn default_max_requests() -> u32 {
    5
}

fn default_admin_window() -> u64 {
    60
}

fn default_admin_max() -> u32 {
    30
}
