//! # gatehouse-core
//!
//! Core crate for Gatehouse, the authentication and session authority.
//! Contains configuration schemas and the unified error system.
//!
//! This crate has **no** internal dependencies on other Gatehouse crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
