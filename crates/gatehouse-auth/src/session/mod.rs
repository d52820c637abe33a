//! Session lifecycle orchestration.

pub mod authority;

pub use authority::{AuthSession, SessionAuthority};
