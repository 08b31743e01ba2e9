//! Scheduled maintenance for the notification backend.
//!
//! This crate provides:
//! - A job executor that runs named handlers
//! - A cron scheduler that triggers them periodically
//! - The stale-pending reconciliation job

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use jobs::ReconciliationJob;
pub use scheduler::CronScheduler;
