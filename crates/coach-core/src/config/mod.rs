//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod logging;
pub mod notifications;
pub mod push;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::database::{DatabaseConfig, LedgerBackend};
pub use self::logging::LoggingConfig;
pub use self::notifications::{MAX_STALE_PENDING_MINUTES, NotificationsConfig, QuietHoursConfig};
pub use self::push::PushConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ledger storage settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Admission-control policy settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Push gateway settings.
    #[serde(default)]
    pub push: PushConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `COACH_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false));

        Self::finish(builder)
    }

    /// Load configuration from an explicit file path plus `COACH_` environment
    /// overrides. A missing file is not an error; defaults apply.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));

        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let config = builder
            .add_source(
                config::Environment::with_prefix("COACH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Reject configurations the policy engine cannot honour.
    pub fn validate(&self) -> Result<(), AppError> {
        self.notifications.validate()?;

        if self.database.backend == LedgerBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres ledger backend",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.notifications.global_daily_limit, 6);
        assert_eq!(config.notifications.category_daily_limit, 2);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let raw = r#"
            [notifications]
            global_daily_limit = 8

            [notifications.source_daily_limits]
            insights = 4
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert_eq!(config.notifications.global_daily_limit, 8);
        assert_eq!(config.notifications.category_daily_limit, 2);
        assert_eq!(
            config.notifications.source_daily_limits.get("insights"),
            Some(&4)
        );
        assert!(config.notifications.quiet_hours.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_postgres_backend_requires_url() {
        let mut config = AppConfig::default();
        config.database.url = String::new();
        config.database.backend = LedgerBackend::Postgres;
        assert!(config.validate().is_err());

        config.database.backend = LedgerBackend::Memory;
        assert!(config.validate().is_ok());
    }
}
