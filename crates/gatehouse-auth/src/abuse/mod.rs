//! Abuse protection for the authentication surface.

pub mod guard;
pub mod limiter;

pub use guard::AbuseGuard;
pub use limiter::FixedWindowLimiter;
