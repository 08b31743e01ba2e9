//! End-to-end admission scenarios through the coordinator.

mod helpers;

use coach_entity::notification::{NotificationStatus, Severity, SourceService};

use helpers::{TestApp, at, request};

#[tokio::test]
async fn test_global_cap_denies_medium() {
    let app = TestApp::new();
    let sources = [
        SourceService::ProactiveEngagement,
        SourceService::ProactiveEngagement,
        SourceService::Achievements,
        SourceService::Achievements,
        SourceService::Insights,
        SourceService::Reminders,
    ];
    for source in sources {
        app.seed(&request(source), NotificationStatus::Sent);
    }

    let decision = app
        .coordinator
        .explain(&request(SourceService::Reminders).with_severity(Severity::Medium))
        .await;
    assert!(!decision.allowed);
    assert_eq!(decision.reason, "global_daily_limit_reached (6/6)");

    let result = app.coordinator.send(request(SourceService::Reminders)).await;
    assert!(result.suppressed);
    assert_eq!(
        result.suppression_reason.as_deref(),
        Some("global_daily_limit_reached (6/6)")
    );
    assert_eq!(app.dispatcher.calls(), 0);
}

#[tokio::test]
async fn test_failed_records_count_toward_cap() {
    let app = TestApp::new();
    for _ in 0..3 {
        app.seed(&request(SourceService::Achievements), NotificationStatus::Failed);
    }
    let decision = app
        .coordinator
        .explain(&request(SourceService::Achievements))
        .await;
    assert_eq!(decision.reason, "source_daily_limit_reached (achievements: 3/3)");
}

#[tokio::test]
async fn test_category_saturation() {
    let app = TestApp::new();
    app.seed(
        &request(SourceService::Insights).with_category("ACTIVITY"),
        NotificationStatus::Sent,
    );
    app.seed(
        &request(SourceService::Achievements).with_category("ACTIVITY"),
        NotificationStatus::Sent,
    );

    let result = app
        .coordinator
        .send(request(SourceService::Reminders).with_category("ACTIVITY"))
        .await;
    assert!(result.suppressed);
    assert_eq!(result.suppression_reason.as_deref(), Some("category_saturation"));

    let id = result.notification_id.expect("recorded");
    let record = app.record(id).await;
    assert_eq!(record.status, NotificationStatus::Suppressed);
    assert_eq!(record.suppression_reason.as_deref(), Some("category_saturation"));

    let other = app
        .coordinator
        .send(request(SourceService::Reminders).with_category("STRESS"))
        .await;
    assert!(other.success);
}

#[tokio::test]
async fn test_theme_dedup_across_producers() {
    let app = TestApp::new();

    let first = app
        .coordinator
        .send(request(SourceService::Insights).with_theme("sleep"))
        .await;
    assert!(first.success);

    let second = app
        .coordinator
        .send(request(SourceService::ProactiveEngagement).with_theme("sleep"))
        .await;
    assert!(second.suppressed);
    assert_eq!(second.suppression_reason.as_deref(), Some("theme_already_sent"));
}

#[tokio::test]
async fn test_quiet_hours_for_low_severity() {
    let app = TestApp::with(Default::default(), at(2));

    let result = app
        .coordinator
        .send(request(SourceService::Reminders).with_severity(Severity::Low))
        .await;
    assert!(result.suppressed);
    assert_eq!(result.suppression_reason.as_deref(), Some("quiet_hours"));

    let high = app
        .coordinator
        .send(request(SourceService::Reminders).with_severity(Severity::High))
        .await;
    assert!(high.success);
}

#[tokio::test]
async fn test_critical_bypass_at_cap() {
    let app = TestApp::new();
    for source in [
        SourceService::StreakAlerts,
        SourceService::Achievements,
        SourceService::Achievements,
        SourceService::Achievements,
        SourceService::Insights,
        SourceService::Insights,
    ] {
        app.seed(&request(source).with_theme("streak"), NotificationStatus::Sent);
    }

    let critical = request(SourceService::StreakAlerts)
        .with_severity(Severity::Critical)
        .with_theme("streak")
        .with_bypass();

    let decision = app.coordinator.explain(&critical).await;
    assert!(decision.allowed);
    assert_eq!(decision.reason, "critical_bypass");

    let result = app.coordinator.send(critical).await;
    assert!(result.success);
    assert_eq!(app.dispatcher.calls(), 1);

    let not_critical = request(SourceService::StreakAlerts)
        .with_severity(Severity::High)
        .with_bypass();
    let denied = app.coordinator.send(not_critical).await;
    assert!(denied.suppressed);
}

#[tokio::test]
async fn test_suppressed_records_do_not_consume_quota() {
    let app = TestApp::new();
    for _ in 0..10 {
        app.seed(&request(SourceService::DailyDigest), NotificationStatus::Suppressed);
    }

    let result = app.coordinator.send(request(SourceService::DailyDigest)).await;
    assert!(result.success);

    let again = app.coordinator.send(request(SourceService::DailyDigest)).await;
    assert_eq!(
        again.suppression_reason.as_deref(),
        Some("source_daily_limit_reached (daily_digest: 1/1)")
    );
}

#[tokio::test]
async fn test_counts_reset_at_day_boundary() {
    let app = TestApp::new();
    let first = app.coordinator.send(request(SourceService::DailyDigest)).await;
    assert!(first.success);

    app.clock.advance(chrono::Duration::days(1));
    let next_day = app.coordinator.send(request(SourceService::DailyDigest)).await;
    assert!(next_day.success);
}
