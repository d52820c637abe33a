//! Server-side token management.
//!
//! Refresh, verification, and reset credentials are opaque random
//! strings stored as database rows; only access tokens are signed.

pub mod service;

pub use service::TokenService;
