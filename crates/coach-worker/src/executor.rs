//! Job executor: runs registered handlers by name.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

/// A unit of scheduled maintenance work.
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Name used to register and trigger the job.
    fn name(&self) -> &str;

    /// Run once and report what was done.
    async fn run(&self) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, retrying will not help
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure, the next tick may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),
}

/// Holds the registered handlers.
#[derive(Debug, Default)]
pub struct JobExecutor {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job handler
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let name = handler.name().to_string();
        tracing::info!(job = %name, "Registered job handler");
        self.handlers.insert(name, handler);
    }

    /// Run the handler registered as `name`.
    pub async fn run(&self, name: &str) -> Result<Value, JobExecutionError> {
        let handler = self.handlers.get(name).ok_or_else(|| {
            JobExecutionError::Permanent(format!("No handler registered for job '{name}'"))
        })?;

        tracing::debug!(job = %name, "Running job");
        let outcome = handler.run().await;
        match &outcome {
            Ok(report) => tracing::info!(job = %name, report = %report, "Job finished"),
            Err(e) => tracing::error!(job = %name, error = %e, "Job failed"),
        }
        outcome
    }

    /// Check if a handler is registered under `name`
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered job names, sorted.
    pub fn registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Echo;

    #[async_trait]
    impl JobHandler for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn run(&self) -> Result<Value, JobExecutionError> {
            Ok(serde_json::json!({"ok": true}))
        }
    }

    #[tokio::test]
    async fn test_runs_registered_handler() {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(Echo));
        assert!(executor.has_handler("echo"));
        assert_eq!(executor.registered(), vec!["echo".to_string()]);

        let report = executor.run("echo").await.expect("run");
        assert_eq!(report["ok"], true);
    }

    #[tokio::test]
    async fn test_unknown_job_is_permanent_failure() {
        let executor = JobExecutor::new();
        let err = executor.run("missing").await.expect_err("unknown job");
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }
}
