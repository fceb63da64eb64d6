//! Runs the scheduler for the lifetime of the process.

use tokio::sync::watch;

use kb_core::error::AppError;

use crate::scheduler::CronScheduler;

/// Owns the cron scheduler and stops it when shutdown is signalled.
#[derive(Debug)]
pub struct WorkerRunner {
    scheduler: CronScheduler,
}

impl WorkerRunner {
    /// Create a new worker runner
    pub fn new(scheduler: CronScheduler) -> Self {
        Self { scheduler }
    }

    /// Start the schedules and block until `shutdown` turns true or its
    /// sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), AppError> {
        self.scheduler.start().await?;
        tracing::info!("Worker runner started");

        while !*shutdown.borrow() {
            if shutdown.changed().await.is_err() {
                break;
            }
        }

        tracing::info!("Worker runner stopping");
        self.scheduler.shutdown().await
    }
}
