//! Cron scheduler for periodic token maintenance.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::info;

use gatehouse_auth::TokenService;
use gatehouse_core::config::worker::WorkerConfig;
use gatehouse_core::error::AppError;

/// Schedules the expired-token sweep.
pub struct MaintenanceScheduler {
    /// The underlying cron scheduler.
    scheduler: JobScheduler,
    /// Token service performing the sweep.
    token_service: Arc<TokenService>,
    /// Cron expression for the sweep.
    sweep_schedule: String,
}

impl std::fmt::Debug for MaintenanceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceScheduler")
            .field("sweep_schedule", &self.sweep_schedule)
            .finish()
    }
}

impl MaintenanceScheduler {
    /// Creates a new scheduler.
    pub async fn new(
        token_service: Arc<TokenService>,
        config: &WorkerConfig,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            token_service,
            sweep_schedule: config.sweep_schedule.clone(),
        })
    }

    /// Registers the sweep task and starts the scheduler.
    ///
    /// One sweep also runs immediately so a long-stopped instance does
    /// not wait a full schedule interval to clear its backlog.
    pub async fn start(&self) -> Result<(), AppError> {
        let token_service = Arc::clone(&self.token_service);
        let job = CronJob::new_async(self.sweep_schedule.as_str(), move |_uuid, _lock| {
            let token_service = Arc::clone(&token_service);
            Box::pin(async move {
                token_service.sweep_expired().await;
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create sweep schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add sweep schedule: {e}")))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!(schedule = %self.sweep_schedule, "Registered: expired-token sweep");

        self.token_service.sweep_expired().await;
        Ok(())
    }

    /// Stops the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;
        info!("Maintenance scheduler shut down");
        Ok(())
    }
}
