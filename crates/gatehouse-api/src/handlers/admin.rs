//! Narrow administrative interface: read-only account and ledger
//! listings.
//!
//! Every handler here is gated three ways: the `admin.enabled` config
//! flag (disabled deployments 404), a valid access token, and the
//! `admin` role. The admin limiter is layered on in the router.

use axum::Json;
use axum::extract::{Query, State};

use gatehouse_core::error::AppError;

use crate::dto::request::PaginationQuery;
use crate::dto::response::{AccountResponse, LoginAttemptResponse, PageResponse};
use crate::error::ApiError;
use crate::extractors::AuthAccount;
use crate::state::AppState;

/// Role required for the admin surface.
const ADMIN_ROLE: &str = "admin";

/// Enforces the config gate and the admin role.
async fn require_admin(state: &AppState, auth: &AuthAccount) -> Result<(), AppError> {
    if !state.config.admin.enabled {
        return Err(AppError::not_found("Not found"));
    }
    if !state.role_authority.has_role(auth.id, ADMIN_ROLE).await? {
        return Err(AppError::authorization("Admin role required"));
    }
    Ok(())
}

/// GET /admin/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PageResponse<AccountResponse>>, ApiError> {
    require_admin(&state, &auth).await?;

    let (limit, offset) = pagination.limit_offset();
    let accounts = state.account_repo.list(limit, offset).await?;

    Ok(Json(PageResponse {
        items: accounts.iter().map(AccountResponse::from).collect(),
        page: pagination.page.max(1),
        per_page: limit,
    }))
}

/// GET /admin/login-attempts
pub async fn list_login_attempts(
    State(state): State<AppState>,
    auth: AuthAccount,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PageResponse<LoginAttemptResponse>>, ApiError> {
    require_admin(&state, &auth).await?;

    let (limit, offset) = pagination.limit_offset();
    let attempts = state.attempt_repo.list(limit, offset).await?;

    Ok(Json(PageResponse {
        items: attempts.iter().map(LoginAttemptResponse::from).collect(),
        page: pagination.page.max(1),
        per_page: limit,
    }))
}
