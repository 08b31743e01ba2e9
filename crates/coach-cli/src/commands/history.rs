//! Ledger history commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use coach_core::error::AppError;
use coach_entity::NotificationRecord;

/// Arguments for the history command
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// User identity
    #[arg(short, long)]
    pub user: String,
    /// Calendar days to include, today counted as the first
    #[arg(short, long, default_value = "1")]
    pub days: u32,
    /// Only records with this theme
    #[arg(short, long)]
    pub theme: Option<String>,
}

/// History display row
#[derive(Debug, Serialize, Tabled)]
struct HistoryRow {
    time: String,
    source: String,
    status: String,
    severity: String,
    theme: String,
    title: String,
    reason: String,
}

impl From<&NotificationRecord> for HistoryRow {
    fn from(record: &NotificationRecord) -> Self {
        Self {
            time: record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            source: record.source_service.to_string(),
            status: record.status.to_string(),
            severity: record.severity.to_string(),
            theme: output::or_dash(record.theme.as_deref()),
            title: record.title.clone(),
            reason: output::or_dash(record.reason()),
        }
    }
}

/// Execute the history command
pub async fn execute(
    args: &HistoryArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let coordinator = super::create_coordinator(config_path).await?;
    let records = coordinator
        .history(&args.user, args.days, args.theme.as_deref())
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&records),
        OutputFormat::Table => {
            let rows: Vec<HistoryRow> = records.iter().map(HistoryRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
