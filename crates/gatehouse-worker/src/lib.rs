//! # gatehouse-worker
//!
//! Background processing for Gatehouse: the outbox runner that delivers
//! durable post-commit jobs, and the cron scheduler for periodic token
//! sweeps.

pub mod handlers;
pub mod runner;
pub mod scheduler;

pub use handlers::JobHandlers;
pub use runner::OutboxRunner;
pub use scheduler::MaintenanceScheduler;
