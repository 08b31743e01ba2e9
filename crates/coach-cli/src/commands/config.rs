//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use coach_core::config::LedgerBackend;
use coach_core::error::AppError;
use coach_database::connection::mask_password;
use coach_entity::SourceService;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate configuration file
    Validate,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut config = super::load_config(config_path)?;
            config.database.url = mask_password(&config.database.url);
            if config.push.api_key.is_some() {
                config.push.api_key = Some("****".to_string());
            }
            match format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => println!("{config:#?}"),
            }
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                let n = &config.notifications;
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                match config.database.backend {
                    LedgerBackend::Postgres => {
                        output::print_kv("Ledger", &mask_password(&config.database.url))
                    }
                    LedgerBackend::Memory => output::print_kv("Ledger", "in-memory"),
                }
                output::print_kv(
                    "Push gateway",
                    if config.push.is_configured() {
                        &config.push.gateway_url
                    } else {
                        "(none)"
                    },
                );
                output::print_kv("Global daily limit", &n.global_daily_limit.to_string());
                output::print_kv("Category daily limit", &n.category_daily_limit.to_string());
                for source in SourceService::ALL {
                    output::print_kv(
                        &format!("Limit {source}"),
                        &n.source_daily_limits
                            .get(source.as_str())
                            .copied()
                            .unwrap_or_else(|| source.default_daily_limit())
                            .to_string(),
                    );
                }
                if n.quiet_hours.enabled {
                    output::print_kv(
                        "Quiet hours",
                        &format!(
                            "{:02}:00-{:02}:00 (UTC{:+} min)",
                            n.quiet_hours.start_hour,
                            n.quiet_hours.end_hour,
                            n.reference_utc_offset_minutes
                        ),
                    );
                } else {
                    output::print_kv("Quiet hours", "disabled");
                }
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}
