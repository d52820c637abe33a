//! Route definitions for the Gatehouse HTTP API.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Builds the complete axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Only the account-mutating public endpoints sit behind the general
    // limiter. Login runs its own email-aware check in the handler, and
    // the token/session routes stay unthrottled so ordinary refresh and
    // profile traffic is never locked out.
    let throttled_auth_routes = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route(
            "/auth/resend-verification",
            post(handlers::auth::resend_verification),
        )
        .route("/auth/password-reset", post(handlers::auth::password_reset))
        .route(
            "/auth/password-reset/confirm",
            post(handlers::auth::password_reset_confirm),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::general_rate_limit,
        ));

    let auth_routes = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/azure", get(handlers::auth::federation_start))
        .route(
            "/auth/azure/callback",
            get(handlers::auth::federation_callback),
        )
        .route("/auth/verify-email", get(handlers::auth::verify_email))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me));

    let admin_routes = Router::new()
        .route("/admin/accounts", get(handlers::admin::list_accounts))
        .route(
            "/admin/login-attempts",
            get(handlers::admin::list_login_attempts),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::admin_rate_limit,
        ));

    let health_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready));

    let cors = build_cors_layer(&state);

    Router::new()
        .merge(throttled_auth_routes)
        .merge(auth_routes)
        .merge(admin_routes)
        .merge(health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS from configuration. `["*"]` opens everything (development
/// only); otherwise each origin is parsed, with unparsable entries
/// dropped with a warning.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors.allowed_origins;

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|_| warn!(origin = %o, "Invalid CORS origin, skipping"))
                    .ok()
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(!state.config.server.cors.allowed_origins.iter().any(|o| o == "*"))
}
