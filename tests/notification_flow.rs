//! End-to-end flow through configuration, bootstrap, and the worker.

use std::sync::Arc;

use coach_core::config::{AppConfig, LedgerBackend};
use coach_entity::{NotificationRequest, NotificationStatus, SourceService};
use coach_worker::jobs::reconciliation::RECONCILIATION_JOB;
use coach_worker::{JobExecutor, ReconciliationJob};

const USER: &str = "flow@example.com";

/// In-memory ledger, no gateway, and no quiet hours so wall-clock time does
/// not influence the outcome.
fn memory_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.backend = LedgerBackend::Memory;
    config.notifications.quiet_hours.enabled = false;
    config
}

#[tokio::test]
async fn test_unconfigured_gateway_fails_and_still_blocks_repeat_theme() {
    let config = memory_config();
    let coordinator = coach_service::build_coordinator(&config, true)
        .await
        .expect("coordinator");

    let first = coordinator
        .send(
            NotificationRequest::new(USER, SourceService::Insights, "sleep_trend", "Sleep", "")
                .with_theme("sleep"),
        )
        .await;
    assert!(!first.success);
    assert!(!first.suppressed);
    assert_eq!(
        first.failure_reason.as_deref(),
        Some("dispatcher_not_configured")
    );

    // A failed attempt still occupies the theme for today.
    let second = coordinator
        .send(
            NotificationRequest::new(USER, SourceService::Reminders, "bedtime", "Bedtime", "")
                .with_theme("sleep"),
        )
        .await;
    assert!(second.suppressed);
    assert_eq!(
        second.suppression_reason.as_deref(),
        Some("theme_already_sent")
    );

    let today = coordinator.today(USER).await.expect("today");
    let statuses: Vec<_> = today.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![NotificationStatus::Failed, NotificationStatus::Suppressed]
    );

    let summary = coordinator.daily_summary(USER).await.expect("summary");
    assert_eq!(summary.global_used, 1);
    assert_eq!(summary.global_remaining, config.notifications.global_daily_limit - 1);
}

#[tokio::test]
async fn test_reconciliation_job_runs_through_executor() {
    let config = memory_config();
    let coordinator = Arc::new(
        coach_service::build_coordinator(&config, true)
            .await
            .expect("coordinator"),
    );

    let mut executor = JobExecutor::new();
    executor.register(Arc::new(ReconciliationJob::new(
        Arc::clone(&coordinator),
        config.notifications.stale_pending_after(),
    )));

    let report = executor.run(RECONCILIATION_JOB).await.expect("job");
    assert_eq!(report["task"], RECONCILIATION_JOB);
    assert_eq!(report["failed"], 0);
    assert_eq!(
        report["older_than_minutes"],
        serde_json::json!(config.notifications.stale_pending_minutes)
    );
}
