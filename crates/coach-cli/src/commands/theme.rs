//! Offline theme classification.

use clap::Args;

use crate::output::{self, OutputFormat};
use coach_core::error::AppError;
use coach_service::extract_theme;

/// Arguments for the theme command
#[derive(Debug, Args)]
pub struct ThemeArgs {
    #[arg(short, long)]
    pub title: String,
    #[arg(short, long, default_value = "")]
    pub body: String,
}

/// Print the theme a title and body classify into.
pub fn execute(args: &ThemeArgs, format: OutputFormat) -> Result<(), AppError> {
    let theme = extract_theme(&args.title, &args.body);

    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({ "theme": theme })),
        OutputFormat::Table => println!("{theme}"),
    }

    Ok(())
}
