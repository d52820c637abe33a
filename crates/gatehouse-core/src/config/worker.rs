//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Outbox runner and maintenance scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Outbox poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Maximum delivery attempts per outbox job.
    #[serde(default = "default_max_attempts")]
    pub max_job_attempts: i32,
    /// Cron expression for the expired-token sweep.
    #[serde(default = "default_sweep_schedule")]
    pub sweep_schedule: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            max_job_attempts: default_max_attempts(),
            sweep_schedule: default_sweep_schedule(),
        }
    }
}

fn default_poll_interval() -> u64 {
    5
}

fn default_max_attempts() -> i32 {
    3
}

// Hourly, at the top of the hour.
fn default_sweep_schedule() -> String {
    "0 0 * * * *".to_string()
}
