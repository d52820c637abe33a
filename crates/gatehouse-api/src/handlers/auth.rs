//! Auth handlers — register, login, federation, verification, reset,
//! refresh, logout, me.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::warn;
use uuid::Uuid;

use gatehouse_core::error::AppError;

use crate::dto::request::{
    EmailRequest, FederationCallbackQuery, LoginRequest, PasswordResetConfirmRequest,
    RefreshRequest, RegisterRequest, VerifyEmailQuery, validate,
};
use crate::dto::response::{
    FederationUrlResponse, MessageResponse, ProfileResponse, RegisterResponse, SessionResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthAccount, ClientIp};
use crate::state::AppState;

/// Cookie carrying the opaque refresh secret.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Builds the refresh-token cookie: HTTP-only, strict same-site, scoped
/// to the whole site, living as long as the token itself.
fn refresh_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(state.config.server.secure_cookies)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::days(
            state.config.auth.refresh_ttl_days as i64,
        ))
        .build()
}

/// Removal counterpart of [`refresh_cookie`].
fn clear_refresh_cookie() -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE).path("/").build()
}

/// The refresh secret from the cookie, or the body as fallback.
fn refresh_secret(jar: &CookieJar, body: Option<&RefreshRequest>) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| body.and_then(|b| b.refresh_token.clone()))
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    validate(&req)?;

    let account = state
        .session_authority
        .register(&req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful. Please check your email for a verification link."
                .to_string(),
            account: (&account).into(),
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ip: ClientIp,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    validate(&req)?;

    if let Err(e) = state.abuse_guard.check_login(ip.as_str(), &req.email).await {
        let retry_after = state.abuse_guard.login_retry_after(ip.as_str());
        let mut response = ApiError(e).into_response();
        if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return Ok(response);
    }

    let session = state
        .session_authority
        .login(&req.email, &req.password, ip.as_str())
        .await?;

    let jar = jar.add(refresh_cookie(&state, session.refresh_token.clone()));
    Ok((
        jar,
        Json(SessionResponse {
            access_token: session.access_token,
            access_expires_at: session.access_expires_at,
            account: (&session.account).into(),
        }),
    )
        .into_response())
}

/// GET /auth/azure
///
/// Returns the provider authorization URL rather than redirecting; the
/// front-end performs the navigation.
pub async fn federation_start(
    State(state): State<AppState>,
) -> Result<Json<FederationUrlResponse>, ApiError> {
    if !state.federation_client.enabled() {
        return Err(AppError::not_found("Federation login is not enabled").into());
    }

    let auth_url = state
        .federation_client
        .build_authorization_url(&Uuid::new_v4().to_string())?;

    Ok(Json(FederationUrlResponse { auth_url }))
}

/// GET /auth/azure/callback
///
/// The provider redirects here with `code`. Success and failure both
/// end in a redirect back to the front-end; tokens never appear in the
/// URL, only in the refresh cookie.
pub async fn federation_callback(
    State(state): State<AppState>,
    ip: ClientIp,
    jar: CookieJar,
    Query(query): Query<FederationCallbackQuery>,
) -> Response {
    match run_federation_callback(&state, &ip, &query).await {
        Ok(session) => {
            let jar = jar.add(refresh_cookie(&state, session.refresh_token));
            let target = format!("{}/auth/callback", state.config.server.frontend_url);
            (jar, Redirect::to(&target)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Federation callback failed");
            let message = if e.is_client_facing() {
                e.message.clone()
            } else {
                "Federation login failed".to_string()
            };
            Redirect::to(&error_redirect(&state.config.server.frontend_url, &message))
                .into_response()
        }
    }
}

async fn run_federation_callback(
    state: &AppState,
    ip: &ClientIp,
    query: &FederationCallbackQuery,
) -> Result<gatehouse_auth::AuthSession, AppError> {
    if !state.federation_client.enabled() {
        return Err(AppError::not_found("Federation login is not enabled"));
    }

    let code = query
        .code
        .as_deref()
        .ok_or_else(|| AppError::validation("Authorization code is required"))?;

    let tokens = state.federation_client.exchange_code(code).await?;
    let identity = state.identity_verifier.verify(&tokens.id_token).await?;

    state
        .session_authority
        .login_with_federation(&identity, ip.as_str())
        .await
}

/// Builds the front-end error redirect with the message URL-encoded.
fn error_redirect(frontend_url: &str, message: &str) -> String {
    match url::Url::parse(&format!("{frontend_url}/auth/error")) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("message", message);
            url.into()
        }
        Err(_) => format!("{frontend_url}/auth/error"),
    }
}

/// GET /auth/verify-email?token=
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.session_authority.verify_email(&query.token).await?;
    Ok(Json(MessageResponse::new("Email verified successfully")))
}

/// POST /auth/resend-verification
///
/// Uniform success whether or not the email exists or is already
/// verified.
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate(&req)?;
    state.session_authority.resend_verification(&req.email).await?;
    Ok(Json(MessageResponse::new(
        "If the email is registered and unverified, a new verification link has been sent",
    )))
}

/// POST /auth/password-reset
///
/// Uniform success whether or not the email exists.
pub async fn password_reset(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate(&req)?;
    state
        .session_authority
        .request_password_reset(&req.email)
        .await?;
    Ok(Json(MessageResponse::new(
        "If the email is registered, a password reset link has been sent",
    )))
}

/// POST /auth/password-reset/confirm
pub async fn password_reset_confirm(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirmRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate(&req)?;
    state
        .session_authority
        .reset_password(&req.token, &req.password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}

/// POST /auth/refresh
///
/// Accepts the refresh secret from the cookie or, as a fallback, the
/// request body. The secret is not rotated; only a new access token is
/// minted.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let secret = refresh_secret(&jar, body.as_ref().map(|Json(b)| b))
        .ok_or_else(|| AppError::authentication("Refresh token is required"))?;

    let session = state.session_authority.refresh_access(&secret).await?;

    Ok(Json(SessionResponse {
        access_token: session.access_token,
        access_expires_at: session.access_expires_at,
        account: (&session.account).into(),
    }))
}

/// POST /auth/logout
///
/// Revokes the presented refresh token and clears the cookie.
/// Idempotent: logging out an already-dead session still succeeds.
pub async fn logout(
    State(state): State<AppState>,
    _auth: AuthAccount,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    if let Some(secret) = refresh_secret(&jar, body.as_ref().map(|Json(b)| b)) {
        state.session_authority.logout(&secret).await?;
    }

    let jar = jar.remove(clear_refresh_cookie());
    Ok((jar, Json(MessageResponse::new("Logged out successfully"))))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthAccount,
) -> Result<Json<ProfileResponse>, ApiError> {
    let roles = state.role_authority.roles(auth.id).await?;
    let permissions = state.role_authority.permissions(auth.id).await?;

    Ok(Json(ProfileResponse {
        account: (&auth.0).into(),
        roles: roles.into_iter().map(|r| r.name).collect(),
        permissions: permissions.into_iter().map(|p| p.name).collect(),
    }))
}
