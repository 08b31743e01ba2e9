//! Stale-pending reconciliation.
//!
//! A crash between recording and finalizing leaves a record `pending`
//! forever. This job fails every `pending` record older than the configured
//! threshold so the audit trail stays truthful.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use serde_json::Value;
use tracing;

use coach_core::error::ErrorKind;
use coach_service::NotificationCoordinator;

use crate::executor::{JobExecutionError, JobHandler};

/// Name under which the job is registered.
pub const RECONCILIATION_JOB: &str = "stale_pending_reconciliation";

/// Fails abandoned `pending` records.
#[derive(Debug)]
pub struct ReconciliationJob {
    coordinator: Arc<NotificationCoordinator>,
    older_than: Duration,
}

impl ReconciliationJob {
    pub fn new(coordinator: Arc<NotificationCoordinator>, older_than: Duration) -> Self {
        Self {
            coordinator,
            older_than,
        }
    }
}

#[async_trait]
impl JobHandler for ReconciliationJob {
    fn name(&self) -> &str {
        RECONCILIATION_JOB
    }

    async fn run(&self) -> Result<Value, JobExecutionError> {
        let failed = self
            .coordinator
            .reconcile_stale(self.older_than)
            .await
            .map_err(|e| {
                if e.is(ErrorKind::Validation) {
                    JobExecutionError::Permanent(format!("Stale sweep misconfigured: {e}"))
                } else {
                    JobExecutionError::Transient(format!("Stale sweep failed: {e}"))
                }
            })?;

        tracing::debug!(failed, "Stale pending sweep complete");

        Ok(serde_json::json!({
            "task": RECONCILIATION_JOB,
            "failed": failed,
            "older_than_minutes": self.older_than.num_minutes(),
        }))
    }
}
