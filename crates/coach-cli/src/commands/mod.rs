//! CLI command definitions and dispatch.

pub mod config;
pub mod history;
pub mod migrate;
pub mod reconcile;
pub mod request;
pub mod send;
pub mod summary;
pub mod theme;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use coach_core::config::AppConfig;
use coach_core::error::AppError;
use coach_service::NotificationCoordinator;

/// Coach notification coordinator administration
#[derive(Debug, Parser)]
#[command(name = "coach-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Send a notification through the coordinator
    Send(send::SendArgs),
    /// Evaluate policy for a request without recording or sending it
    Explain(send::ExplainArgs),
    /// Show a user's notification ledger
    History(history::HistoryArgs),
    /// Show a user's daily budget
    Summary(summary::SummaryArgs),
    /// Classify a title and body into a theme
    Theme(theme::ThemeArgs),
    /// Fail pending records abandoned mid-send
    Reconcile(reconcile::ReconcileArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
            Commands::Send(args) => send::execute_send(args, &self.config, self.format).await,
            Commands::Explain(args) => {
                send::execute_explain(args, &self.config, self.format).await
            }
            Commands::History(args) => history::execute(args, &self.config, self.format).await,
            Commands::Summary(args) => summary::execute(args, &self.config, self.format).await,
            Commands::Theme(args) => theme::execute(args, self.format),
            Commands::Reconcile(args) => reconcile::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}

/// Helper: build a coordinator from the configuration file
pub async fn create_coordinator(config_path: &str) -> Result<NotificationCoordinator, AppError> {
    let config = load_config(config_path)?;
    coach_service::build_coordinator(&config, false).await
}
