//! Outbox runner — polls for pending jobs and delivers them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{error, info, warn};

use gatehouse_core::config::worker::WorkerConfig;
use gatehouse_database::repositories::OutboxRepository;

use crate::handlers::JobHandlers;

/// Polls the outbox table and delivers claimed jobs.
///
/// Claims use `FOR UPDATE SKIP LOCKED`, so multiple runners (or multiple
/// instances of the whole process) can poll the same table without
/// double-delivering. A job that fails is retried on a later poll until
/// its attempts are exhausted.
#[derive(Debug)]
pub struct OutboxRunner {
    /// Outbox table access.
    outbox_repo: Arc<OutboxRepository>,
    /// Job dispatch.
    handlers: Arc<JobHandlers>,
    /// Sleep between empty polls.
    poll_interval: Duration,
}

impl OutboxRunner {
    /// Creates a new runner.
    pub fn new(
        outbox_repo: Arc<OutboxRepository>,
        handlers: Arc<JobHandlers>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            outbox_repo,
            handlers,
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
        }
    }

    /// Runs until the cancel signal flips to `true`.
    ///
    /// Jobs are drained back-to-back while any are pending; the poll
    /// interval only applies when the table is empty.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "Outbox runner started"
        );

        loop {
            if *cancel.borrow() {
                break;
            }

            match self.process_next().await {
                // Something was processed; poll again immediately.
                true => continue,
                false => {
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                break;
                            }
                        }
                        _ = time::sleep(self.poll_interval) => {}
                    }
                }
            }
        }

        info!("Outbox runner shut down");
    }

    /// Claims and delivers at most one job. Returns whether a job was
    /// claimed.
    async fn process_next(&self) -> bool {
        let job = match self.outbox_repo.claim_next().await {
            Ok(Some(job)) => job,
            Ok(None) => return false,
            Err(e) => {
                error!(error = %e, "Failed to claim outbox job");
                return false;
            }
        };

        info!(
            job_id = %job.id,
            job_type = %job.job_type,
            attempt = job.attempts,
            max_attempts = job.max_attempts,
            "Processing outbox job"
        );

        match self.handlers.handle(&job).await {
            Ok(()) => {
                if let Err(e) = self.outbox_repo.mark_completed(job.id).await {
                    error!(job_id = %job.id, error = %e, "Failed to mark job completed");
                }
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Outbox job delivery failed");
                if let Err(e) = self
                    .outbox_repo
                    .mark_attempt_failed(job.id, &e.to_string())
                    .await
                {
                    error!(job_id = %job.id, error = %e, "Failed to record job failure");
                }
            }
        }

        true
    }
}
