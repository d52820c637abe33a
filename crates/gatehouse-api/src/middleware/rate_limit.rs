//! Per-IP throttling middleware over the abuse guard.
//!
//! Two layers exist: the general limiter over the account-mutating
//! public auth endpoints and the admin limiter over `/admin`. Login is
//! not under either; it runs its own email-aware check inside its
//! handler.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::extractors::client_ip::client_ip_from_parts;
use crate::state::AppState;

/// Applies the general limiter to every request passing through.
pub async fn general_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = ip_of(&request);
    if let Err(e) = state.abuse_guard.check_general(&ip) {
        return ApiError(e).into_response();
    }
    next.run(request).await
}

/// Applies the admin limiter to every request passing through.
pub async fn admin_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = ip_of(&request);
    if let Err(e) = state.abuse_guard.check_admin(&ip) {
        return ApiError(e).into_response();
    }
    next.run(request).await
}

fn ip_of(request: &Request) -> String {
    client_ip_from_parts(
        request.headers(),
        request.extensions().get::<ConnectInfo<SocketAddr>>(),
    )
}
