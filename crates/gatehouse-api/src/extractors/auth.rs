//! `AuthAccount` extractor — validates the bearer token and loads the
//! account behind it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use gatehouse_core::error::AppError;
use gatehouse_entity::account::Account;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated account, extracted from the `Authorization` header.
///
/// Validation is two-step: the access token's signature and expiry, then
/// a live account lookup so a deactivated account loses access within
/// one access-token lifetime at most, without a token blocklist.
#[derive(Debug, Clone)]
pub struct AuthAccount(pub Account);

impl std::ops::Deref for AuthAccount {
    type Target = Account;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let claims = state.jwt_decoder.decode_access_token(token)?;

        let account = state
            .account_repo
            .find_by_id(claims.account_id())
            .await?
            .ok_or_else(|| AppError::authentication("Invalid or expired token"))?;

        if !account.is_active {
            return Err(AppError::authentication("Account is disabled").into());
        }

        Ok(AuthAccount(account))
    }
}
