//! Cron scheduler for periodic maintenance jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use coach_core::error::AppError;

use crate::executor::JobExecutor;

/// Triggers registered jobs on cron schedules (six-field, with seconds).
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Jobs to trigger
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("jobs", &self.executor.registered())
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Run job `name` on `cron`.
    pub async fn schedule(&self, name: &str, cron: &str) -> Result<(), AppError> {
        if !self.executor.has_handler(name) {
            return Err(AppError::configuration(format!(
                "Cannot schedule unknown job '{name}'"
            )));
        }

        let executor = Arc::clone(&self.executor);
        let job_name = name.to_string();
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let job_name = job_name.clone();
            Box::pin(async move {
                // Failures are logged by the executor; the next tick retries.
                let _ = executor.run(&job_name).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid cron expression '{cron}' for {name}: {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {name} schedule: {e}")))?;

        tracing::info!(job = %name, cron = %cron, "Registered scheduled job");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
