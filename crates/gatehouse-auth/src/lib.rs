//! # gatehouse-auth
//!
//! The authentication and session authority for Gatehouse.
//!
//! ## Modules
//!
//! - `password` — Argon2id password hashing and the length policy
//! - `jwt` — RS256 access-token creation and validation
//! - `token` — server-side token service (refresh, verification, reset, sweep)
//! - `session` — the session authority orchestrating register/login/reset flows
//! - `rbac` — role and permission resolution
//! - `federation` — OAuth identity-provider bridge
//! - `abuse` — fixed-window request throttling backed by the attempt ledger
//! - `email` — outbound mail strategy (stub or HTTP provider)

pub mod abuse;
pub mod email;
pub mod federation;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;
pub mod token;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use session::{AuthSession, SessionAuthority};
pub use token::TokenService;
