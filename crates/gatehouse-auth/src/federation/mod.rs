//! OAuth identity-provider bridge.
//!
//! The bridge covers the authorization-code flow against an Azure AD
//! tenant: building the redirect URL, exchanging the returned code, and
//! verifying the provider-issued identity token against the tenant's
//! published signing keys.

pub mod client;
pub mod verifier;

pub use client::{FederationClient, TokenResponse};
pub use verifier::{FederatedIdentity, IdentityVerifier};
