//! End-to-end tests against the full HTTP surface.
//!
//! Tests that touch PostgreSQL are `#[ignore]`d; run them against a
//! disposable database with:
//!
//! ```sh
//! GATEHOUSE_TEST_DATABASE_URL=postgres://... cargo test --test integration -- --ignored
//! ```

mod helpers;

mod admin_flow;
mod auth_flow;
mod throttle_flow;
mod token_flow;
