//! Background work for the knowledge base.
//!
//! This crate provides:
//! - A job executor that dispatches runs to registered handlers
//! - A cron scheduler that triggers handlers on their schedules
//! - A runner that ties the scheduler to the process shutdown signal
//! - The built-in share-link cleanup job

pub mod executor;
pub mod jobs;
pub mod runner;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler, JobRun};
pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
