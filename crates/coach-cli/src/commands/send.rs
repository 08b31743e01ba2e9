//! `send` and `explain` commands.

use clap::Args;

use crate::commands::request::RequestArgs;
use crate::output::{self, OutputFormat};
use coach_core::error::AppError;

/// Arguments for the send command
#[derive(Debug, Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub request: RequestArgs,
}

/// Arguments for the explain command
#[derive(Debug, Args)]
pub struct ExplainArgs {
    #[command(flatten)]
    pub request: RequestArgs,
}

/// Send one notification and print the outcome.
pub async fn execute_send(
    args: &SendArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let request = args.request.to_request()?;
    let coordinator = super::create_coordinator(config_path).await?;
    let result = coordinator.send(request).await;

    match format {
        OutputFormat::Json => output::print_json(&result),
        OutputFormat::Table => {
            let id = result
                .notification_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            if result.success {
                output::print_success(&format!(
                    "Sent to {} device(s)",
                    result.delivered_count
                ));
            } else if result.suppressed {
                output::print_warning(&format!(
                    "Suppressed: {}",
                    output::or_dash(result.suppression_reason.as_deref())
                ));
            } else {
                output::print_error(&format!(
                    "Failed: {}",
                    output::or_dash(result.failure_reason.as_deref())
                ));
            }
            output::print_kv("Notification", &id);
        }
    }

    Ok(())
}

/// Print the policy decision for a request without side effects.
pub async fn execute_explain(
    args: &ExplainArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let request = args.request.to_request()?;
    let coordinator = super::create_coordinator(config_path).await?;
    let decision = coordinator.explain(&request).await;

    match format {
        OutputFormat::Json => output::print_json(&decision),
        OutputFormat::Table => {
            if decision.allowed {
                output::print_success(&format!("Allowed ({})", decision.reason));
            } else {
                output::print_warning(&format!("Denied ({})", decision.reason));
            }
        }
    }

    Ok(())
}
