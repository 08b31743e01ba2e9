//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use coach_core::config::LedgerBackend;
use coach_core::error::AppError;
use coach_database::DatabasePool;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    if config.database.backend == LedgerBackend::Memory {
        output::print_warning("database.backend is 'memory'; nothing to migrate.");
        return Ok(());
    }

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            let db = DatabasePool::connect(&config.database).await?;
            db.migrate().await?;
            output::print_success("All migrations applied successfully.");
        }
    }

    Ok(())
}
