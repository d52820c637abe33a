//! # gatehouse-api
//!
//! The HTTP surface of Gatehouse: an axum router over the session
//! authority, with bearer-token extraction, refresh-token cookies,
//! per-IP throttling middleware, and the narrow admin interface.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
