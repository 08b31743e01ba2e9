//! Daily budget summary.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use coach_core::error::AppError;

/// Arguments for the summary command
#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// User identity
    #[arg(short, long)]
    pub user: String,
}

#[derive(Debug, Serialize, Tabled)]
struct QuotaRow {
    source: String,
    used: u32,
    limit: u32,
    remaining: u32,
}

/// Execute the summary command
pub async fn execute(
    args: &SummaryArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let coordinator = super::create_coordinator(config_path).await?;
    let summary = coordinator.daily_summary(&args.user).await?;

    if format == OutputFormat::Json {
        output::print_json(&summary);
        return Ok(());
    }

    println!("Daily summary for {}", summary.user_identity);
    output::print_kv(
        "Day",
        &format!(
            "{} .. {}",
            summary.day.start.format("%Y-%m-%d %H:%M"),
            summary.day.end.format("%Y-%m-%d %H:%M")
        ),
    );
    output::print_kv(
        "Global",
        &format!(
            "{}/{} used, {} remaining",
            summary.global_used, summary.global_limit, summary.global_remaining
        ),
    );
    for entry in &summary.status_counts {
        output::print_kv(entry.status.as_str(), &entry.count.to_string());
    }
    println!();

    let rows: Vec<QuotaRow> = summary
        .sources
        .iter()
        .map(|q| QuotaRow {
            source: q.source.to_string(),
            used: q.used,
            limit: q.limit,
            remaining: q.remaining,
        })
        .collect();
    output::print_list(&rows, format);

    Ok(())
}
