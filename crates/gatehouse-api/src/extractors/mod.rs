//! Custom axum extractors.

pub mod auth;
pub mod client_ip;

pub use auth::AuthAccount;
pub use client_ip::ClientIp;
