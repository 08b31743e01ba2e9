//! Manual stale-pending sweep.

use clap::Args;

use crate::output::{self, OutputFormat};
use coach_core::error::AppError;

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Age in minutes after which a pending record is failed
    /// (defaults to `notifications.stale_pending_minutes`)
    #[arg(long)]
    pub older_than_minutes: Option<i64>,
}

/// Execute the reconcile command
pub async fn execute(
    args: &ReconcileArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let older_than = match args.older_than_minutes {
        Some(minutes) if minutes > 0 => chrono::Duration::try_minutes(minutes).ok_or_else(|| {
            AppError::validation(format!("--older-than-minutes out of range: {minutes}"))
        })?,
        Some(minutes) => {
            return Err(AppError::validation(format!(
                "--older-than-minutes must be positive, got {minutes}"
            )));
        }
        None => config.notifications.stale_pending_after(),
    };

    let coordinator = coach_service::build_coordinator(&config, false).await?;
    let failed = coordinator.reconcile_stale(older_than).await?;

    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "failed": failed,
            "older_than_minutes": older_than.num_minutes(),
        })),
        OutputFormat::Table => output::print_success(&format!(
            "Failed {failed} pending record(s) older than {} minutes",
            older_than.num_minutes()
        )),
    }

    Ok(())
}
