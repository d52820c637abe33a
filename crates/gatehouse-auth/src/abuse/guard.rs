//! Throttling decisions for the authentication endpoints.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use gatehouse_core::config::rate_limit::RateLimitConfig;
use gatehouse_core::error::AppError;
use gatehouse_database::repositories::LoginAttemptRepository;

use super::limiter::FixedWindowLimiter;

/// Gatekeeper consulted before every authentication request.
///
/// Three independent fixed-window limiters keyed by client IP cover the
/// general auth surface, login specifically, and the administrative
/// endpoints. The login limiter additionally consults the persistent
/// login-attempt ledger per email.
pub struct AbuseGuard {
    /// Per-IP limiter for the general auth surface.
    general: FixedWindowLimiter,
    /// Per-IP limiter for login requests.
    login: FixedWindowLimiter,
    /// Per-IP limiter for administrative endpoints.
    admin: FixedWindowLimiter,
    /// Login-attempt ledger for per-email failure counts.
    attempt_repo: Arc<LoginAttemptRepository>,
    /// Failed-attempt threshold per email within the window.
    login_threshold: i64,
    /// Ledger lookback window.
    ledger_window: chrono::Duration,
}

impl std::fmt::Debug for AbuseGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbuseGuard")
            .field("login_threshold", &self.login_threshold)
            .field("ledger_window", &self.ledger_window)
            .finish()
    }
}

impl AbuseGuard {
    /// Creates an abuse guard from throttling configuration.
    pub fn new(config: &RateLimitConfig, attempt_repo: Arc<LoginAttemptRepository>) -> Self {
        let window = Duration::from_secs(config.window_seconds);
        Self {
            general: FixedWindowLimiter::new(window, config.max_requests),
            login: FixedWindowLimiter::new(window, config.login_max_requests),
            admin: FixedWindowLimiter::new(
                Duration::from_secs(config.admin_window_seconds),
                config.admin_max_requests,
            ),
            attempt_repo,
            login_threshold: config.login_max_requests as i64,
            ledger_window: chrono::Duration::seconds(config.window_seconds as i64),
        }
    }

    /// Throttles a request on the general auth surface by client IP.
    pub fn check_general(&self, ip: &str) -> Result<(), AppError> {
        if self.general.check(ip) {
            Ok(())
        } else {
            warn!(ip = %ip, "General rate limit exceeded");
            Err(AppError::rate_limited(
                "Too many requests from this IP, please try again later",
            ))
        }
    }

    /// Throttles a request on the administrative surface by client IP.
    pub fn check_admin(&self, ip: &str) -> Result<(), AppError> {
        if self.admin.check(ip) {
            Ok(())
        } else {
            warn!(ip = %ip, "Admin rate limit exceeded");
            Err(AppError::rate_limited(
                "Too many requests from this IP, please try again later",
            ))
        }
    }

    /// Throttles a login request.
    ///
    /// The per-IP counter sees every login request, but its verdict only
    /// binds once the ledger already holds the threshold of recorded
    /// failures for the target email within the window; below that the
    /// request passes regardless of the counter. Once the ledger is
    /// saturated the next attempt from an IP that has spent its window
    /// is refused whatever credentials it carries. A ledger read failure
    /// fails open with a warning rather than blocking all logins.
    pub async fn check_login(&self, ip: &str, email: &str) -> Result<(), AppError> {
        let within_cap = self.login.check(ip);

        let failures = match self
            .attempt_repo
            .count_recent_failures(email, self.ledger_window)
            .await
        {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "Failed to read attempt ledger, allowing login");
                return Ok(());
            }
        };

        if failures < self.login_threshold || within_cap {
            return Ok(());
        }

        warn!(ip = %ip, failures, "Login rate limit exceeded");
        Err(AppError::rate_limited(
            "Too many login attempts from this IP, please try again later",
        ))
    }

    /// Seconds until the login window for this IP resets.
    pub fn login_retry_after(&self, ip: &str) -> u64 {
        self.login.retry_after_seconds(ip)
    }
}
