//! Role-based access control.

pub mod authority;

pub use authority::RoleAuthority;
