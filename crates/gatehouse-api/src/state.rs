//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use gatehouse_auth::abuse::AbuseGuard;
use gatehouse_auth::federation::{FederationClient, IdentityVerifier};
use gatehouse_auth::jwt::JwtDecoder;
use gatehouse_auth::rbac::RoleAuthority;
use gatehouse_auth::session::SessionAuthority;
use gatehouse_core::config::AppConfig;
use gatehouse_database::DatabasePool;
use gatehouse_database::repositories::{AccountRepository, LoginAttemptRepository};

/// Application state containing all shared dependencies.
///
/// Passed to every axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Database handle, used by the readiness probe.
    pub db: DatabasePool,
    /// Access-token validation.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Session lifecycle orchestration.
    pub session_authority: Arc<SessionAuthority>,
    /// Role and permission resolution.
    pub role_authority: Arc<RoleAuthority>,
    /// Request throttling.
    pub abuse_guard: Arc<AbuseGuard>,
    /// OAuth endpoints of the identity provider.
    pub federation_client: Arc<FederationClient>,
    /// Provider identity-token verification.
    pub identity_verifier: Arc<IdentityVerifier>,
    /// Account reads for extractors and the admin interface.
    pub account_repo: Arc<AccountRepository>,
    /// Attempt-ledger reads for the admin interface.
    pub attempt_repo: Arc<LoginAttemptRepository>,
}
