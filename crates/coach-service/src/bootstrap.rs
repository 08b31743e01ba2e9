//! Wiring a coordinator from loaded configuration.

use std::sync::Arc;

use tracing::{info, warn};

use coach_core::config::AppConfig;
use coach_core::result::AppResult;
use coach_core::traits::SystemClock;

use crate::coordinator::NotificationCoordinator;
use crate::dispatch::{Dispatcher, HttpPushDispatcher, NullDispatcher};

/// The dispatcher `config.push` describes. Without a gateway URL every
/// allowed notification fails with `dispatcher_not_configured`.
pub fn dispatcher_from_config(config: &AppConfig) -> AppResult<Arc<dyn Dispatcher>> {
    if config.push.is_configured() {
        info!(gateway = %config.push.gateway_url, "Using HTTP push gateway");
        Ok(Arc::new(HttpPushDispatcher::new(&config.push)?))
    } else {
        warn!("push.gateway_url is empty; notifications will not be delivered");
        Ok(Arc::new(NullDispatcher))
    }
}

/// Open the ledger, pick the dispatcher, and build a coordinator on the
/// system clock.
pub async fn build_coordinator(
    config: &AppConfig,
    migrate: bool,
) -> AppResult<NotificationCoordinator> {
    let ledger = coach_database::open_ledger(&config.database, migrate).await?;
    let dispatcher = dispatcher_from_config(config)?;

    Ok(NotificationCoordinator::new(
        ledger,
        dispatcher,
        Arc::new(SystemClock),
        config.notifications.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::config::LedgerBackend;

    #[tokio::test]
    async fn test_memory_backend_builds_without_database() {
        let mut config = AppConfig::default();
        config.database.backend = LedgerBackend::Memory;

        let coordinator = build_coordinator(&config, true).await.expect("build");
        let today = coordinator.today("ana@example.com").await.expect("today");
        assert!(today.is_empty());
    }

    #[tokio::test]
    async fn test_missing_gateway_falls_back_to_null_dispatcher() {
        let config = AppConfig::default();
        let dispatcher = dispatcher_from_config(&config).expect("dispatcher");

        let payload = crate::dispatch::DispatchPayload {
            title: "Hi".to_string(),
            body: String::new(),
            data: serde_json::Value::Null,
        };
        let err = dispatcher
            .dispatch(
                coach_entity::DeliveryChannel::Push,
                "ana@example.com",
                &payload,
            )
            .await
            .expect_err("null dispatcher");
        assert_eq!(err.to_string(), "dispatcher_not_configured");
    }
}
