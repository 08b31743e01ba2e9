//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background job worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether scheduled maintenance jobs run in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Run each scheduled job once at startup before the first cron tick.
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            run_on_startup: true,
        }
    }
}

fn default_true() -> bool {
    true
}
