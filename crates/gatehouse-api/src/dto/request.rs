//! Request DTOs with input validation.

use serde::Deserialize;
use validator::Validate;

use gatehouse_core::error::AppError;

/// POST /auth/register body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address to register.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Chosen password; strength is checked by the password policy.
    pub password: String,
}

/// POST /auth/login body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /auth/refresh body. The cookie takes precedence; the body field
/// is the fallback transport.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token, when not supplied via cookie.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body of the resend-verification and password-reset-request endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailRequest {
    /// Target email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// POST /auth/password-reset/confirm body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordResetConfirmRequest {
    /// Reset token from the emailed link.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    /// Replacement password.
    pub password: String,
}

/// Query parameters of GET /auth/verify-email.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailQuery {
    /// Verification token from the emailed link.
    pub token: String,
}

/// Query parameters of the provider callback.
#[derive(Debug, Clone, Deserialize)]
pub struct FederationCallbackQuery {
    /// Authorization code, absent when the provider reports an error.
    #[serde(default)]
    pub code: Option<String>,
    /// Opaque state echoed back by the provider.
    #[serde(default)]
    pub state: Option<String>,
}

/// Pagination query parameters for the admin listings.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Page size, capped at 100.
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

impl PaginationQuery {
    /// Clamped limit/offset pair.
    pub fn limit_offset(&self) -> (i64, i64) {
        let per_page = self.per_page.clamp(1, 100);
        let page = self.page.max(1);
        (per_page, (page - 1) * per_page)
    }
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

/// Runs `validator` checks, folding failures into a validation error
/// carrying the first message.
pub fn validate(input: &impl Validate) -> Result<(), AppError> {
    input.validate().map_err(|errors| {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref())
            .next()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "Invalid request".to_string());
        AppError::validation(message)
    })
}
