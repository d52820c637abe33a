//! # gatehouse-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for all Gatehouse entities.
//!
//! Repository methods that participate in a grouped mutation take an
//! explicit `&mut PgConnection` so a single transaction can be threaded
//! through the whole call chain by the caller; standalone reads and
//! single-statement writes go straight through the pool.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
