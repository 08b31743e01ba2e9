//! Process-local notification ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use coach_core::error::AppError;
use coach_core::result::AppResult;
use coach_core::types::{DayWindow, NotificationId};
use coach_entity::notification::{NotificationRecord, NotificationStatus, SourceService};

use crate::ledger::{DayScope, NotificationLedger, STALE_PENDING_REASON, StatusUpdate};

/// Ledger backed by a concurrent map. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: DashMap<NotificationId, NotificationRecord>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record as-is, whatever its status. Used to load fixtures.
    pub fn insert(&self, record: NotificationRecord) {
        self.records.insert(record.id, record);
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn count_where(&self, scope: &DayScope, predicate: impl Fn(&NotificationRecord) -> bool) -> u32 {
        let count = self
            .records
            .iter()
            .filter(|entry| scope.counts(entry.value()) && predicate(entry.value()))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn any_where(&self, scope: &DayScope, predicate: impl Fn(&NotificationRecord) -> bool) -> bool {
        self.records
            .iter()
            .any(|entry| scope.counts(entry.value()) && predicate(entry.value()))
    }
}

#[async_trait]
impl NotificationLedger for InMemoryLedger {
    async fn record_pending(&self, record: &NotificationRecord) -> AppResult<NotificationId> {
        if record.status != NotificationStatus::Pending {
            return Err(AppError::validation(format!(
                "New ledger records must be pending, got {}",
                record.status
            )));
        }
        if self.records.contains_key(&record.id) {
            return Err(AppError::conflict(format!(
                "Notification {} already recorded",
                record.id
            )));
        }
        self.records.insert(record.id, record.clone());
        Ok(record.id)
    }

    async fn update_status(&self, id: NotificationId, update: StatusUpdate) -> AppResult<()> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        entry.status.ensure_transition(update.status)?;
        update.apply_to(entry.value_mut());
        Ok(())
    }

    async fn count_today(&self, scope: &DayScope, source: Option<SourceService>) -> AppResult<u32> {
        Ok(self.count_where(scope, |r| {
            source.is_none_or(|source| r.source_service == source)
        }))
    }

    async fn was_theme_sent_today(&self, scope: &DayScope, theme: &str) -> AppResult<bool> {
        Ok(self.any_where(scope, |r| r.theme.as_deref() == Some(theme)))
    }

    async fn count_category_today(&self, scope: &DayScope, category: &str) -> AppResult<u32> {
        Ok(self.count_where(scope, |r| r.category.as_deref() == Some(category)))
    }

    async fn was_entity_notified_today(
        &self,
        scope: &DayScope,
        entity_type: &str,
        entity_id: &str,
    ) -> AppResult<bool> {
        Ok(self.any_where(scope, |r| {
            r.related_entity() == Some((entity_type, entity_id))
        }))
    }

    async fn get_today(&self, scope: &DayScope) -> AppResult<Vec<NotificationRecord>> {
        let mut records: Vec<NotificationRecord> = self
            .records
            .iter()
            .filter(|entry| scope.covers(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|r| (r.created_at, r.id.into_uuid()));
        Ok(records)
    }

    async fn get_history(
        &self,
        user_identity: &str,
        window: &DayWindow,
        theme: Option<&str>,
    ) -> AppResult<Vec<NotificationRecord>> {
        let mut records: Vec<NotificationRecord> = self
            .records
            .iter()
            .filter(|entry| {
                let r = entry.value();
                r.user_identity == user_identity
                    && window.contains(r.created_at)
                    && theme.is_none_or(|t| r.theme.as_deref() == Some(t))
            })
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|r| std::cmp::Reverse((r.created_at, r.id.into_uuid())));
        Ok(records)
    }

    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<NotificationRecord>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn fail_stale_pending(&self, older_than: DateTime<Utc>) -> AppResult<u64> {
        let mut changed = 0;
        for mut entry in self.records.iter_mut() {
            let record = entry.value_mut();
            // Failed rows carry no transition timestamp, only the reason.
            if record.status == NotificationStatus::Pending && record.created_at < older_than {
                record.status = NotificationStatus::Failed;
                record.failure_reason = Some(STALE_PENDING_REASON.to_string());
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn count_by_status_today(
        &self,
        scope: &DayScope,
    ) -> AppResult<HashMap<NotificationStatus, u32>> {
        let mut counts = HashMap::new();
        for entry in self.records.iter() {
            if scope.covers(entry.value()) {
                *counts.entry(entry.value().status).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, TimeZone};
    use coach_core::error::ErrorKind;
    use coach_entity::notification::NotificationRequest;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 12, 0, 0).single().expect("valid time")
    }

    fn scope(user: &str) -> DayScope {
        let offset = FixedOffset::east_opt(0).expect("offset");
        DayScope::new(user, DayWindow::containing(noon(), offset))
    }

    fn record(user: &str, source: SourceService, at: DateTime<Utc>) -> NotificationRecord {
        let request = NotificationRequest::new(user, source, "test", "Title", "Body");
        NotificationRecord::pending(&request, at)
    }

    fn with_status(mut record: NotificationRecord, status: NotificationStatus) -> NotificationRecord {
        record.status = status;
        record
    }

    #[tokio::test]
    async fn test_counts_skip_suppressed_and_excluded() {
        let ledger = InMemoryLedger::new();
        let sent = with_status(record("ana", SourceService::Insights, noon()), NotificationStatus::Sent);
        let failed = with_status(record("ana", SourceService::Reminders, noon()), NotificationStatus::Failed);
        let suppressed = with_status(
            record("ana", SourceService::Insights, noon()),
            NotificationStatus::Suppressed,
        );
        let pending = record("ana", SourceService::Insights, noon());
        let pending_id = pending.id;
        for r in [sent, failed, suppressed, pending] {
            ledger.insert(r);
        }

        let all = scope("ana");
        assert_eq!(ledger.count_today(&all, None).await.expect("count"), 3);
        assert_eq!(
            ledger
                .count_today(&all, Some(SourceService::Insights))
                .await
                .expect("count"),
            2
        );

        let excluding = scope("ana").excluding(Some(pending_id));
        assert_eq!(ledger.count_today(&excluding, None).await.expect("count"), 2);
    }

    #[tokio::test]
    async fn test_day_window_and_user_isolation() {
        let ledger = InMemoryLedger::new();
        ledger.insert(record("ana", SourceService::Insights, noon() - Duration::days(1)));
        ledger.insert(record("ben", SourceService::Insights, noon()));

        assert_eq!(ledger.count_today(&scope("ana"), None).await.expect("count"), 0);
        assert_eq!(ledger.count_today(&scope("ben"), None).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn test_theme_category_and_entity_queries() {
        let ledger = InMemoryLedger::new();
        let request = NotificationRequest::new("ana", SourceService::Achievements, "badge", "t", "b")
            .with_theme("sleep")
            .with_category("ACTIVITY")
            .with_entity("workout", "w-1");
        ledger.insert(with_status(
            NotificationRecord::pending(&request, noon()),
            NotificationStatus::Sent,
        ));

        let suppressed = NotificationRequest::new("ana", SourceService::Insights, "x", "t", "b")
            .with_theme("stress");
        ledger.insert(with_status(
            NotificationRecord::pending(&suppressed, noon()),
            NotificationStatus::Suppressed,
        ));

        let s = scope("ana");
        assert!(ledger.was_theme_sent_today(&s, "sleep").await.expect("theme"));
        assert!(!ledger.was_theme_sent_today(&s, "stress").await.expect("theme"));
        assert_eq!(ledger.count_category_today(&s, "ACTIVITY").await.expect("category"), 1);
        assert!(
            ledger
                .was_entity_notified_today(&s, "workout", "w-1")
                .await
                .expect("entity")
        );
        assert!(
            !ledger
                .was_entity_notified_today(&s, "workout", "w-2")
                .await
                .expect("entity")
        );
    }

    #[tokio::test]
    async fn test_status_transitions_happen_once() {
        let ledger = InMemoryLedger::new();
        let pending = record("ana", SourceService::Reminders, noon());
        let id = ledger.record_pending(&pending).await.expect("record");

        ledger
            .update_status(id, StatusUpdate::sent(2, noon()))
            .await
            .expect("first transition");

        let stored = ledger.find_by_id(id).await.expect("find").expect("exists");
        assert_eq!(stored.status, NotificationStatus::Sent);
        assert_eq!(stored.sent_at, Some(noon()));
        assert_eq!(stored.delivered_count, Some(2));

        let err = ledger
            .update_status(id, StatusUpdate::failed("late", noon()))
            .await
            .expect_err("second transition");
        assert!(err.is(ErrorKind::Conflict));

        let missing = ledger
            .update_status(NotificationId::new(), StatusUpdate::sent(1, noon()))
            .await
            .expect_err("unknown id");
        assert!(missing.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_record_pending_rejects_non_pending() {
        let ledger = InMemoryLedger::new();
        let sent = with_status(record("ana", SourceService::Insights, noon()), NotificationStatus::Sent);
        let err = ledger.record_pending(&sent).await.expect_err("non-pending");
        assert!(err.is(ErrorKind::Validation));
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_fail_stale_pending() {
        let ledger = InMemoryLedger::new();
        let old = record("ana", SourceService::Insights, noon() - Duration::hours(1));
        let fresh = record("ana", SourceService::Insights, noon());
        let old_id = old.id;
        let fresh_id = fresh.id;
        ledger.insert(old);
        ledger.insert(fresh);

        let changed = ledger
            .fail_stale_pending(noon() - Duration::minutes(15))
            .await
            .expect("sweep");
        assert_eq!(changed, 1);

        let old = ledger.find_by_id(old_id).await.expect("find").expect("exists");
        assert_eq!(old.status, NotificationStatus::Failed);
        assert_eq!(old.failure_reason.as_deref(), Some(STALE_PENDING_REASON));
        assert_eq!(old.sent_at, None);
        assert_eq!(old.created_at, noon() - Duration::hours(1));

        let fresh = ledger.find_by_id(fresh_id).await.expect("find").expect("exists");
        assert_eq!(fresh.status, NotificationStatus::Pending);
    }

    #[tokio::test]
    async fn test_history_and_status_breakdown() {
        let ledger = InMemoryLedger::new();
        let sleep = NotificationRequest::new("ana", SourceService::Insights, "x", "t", "b")
            .with_theme("sleep");
        let earlier = NotificationRecord::pending(&sleep, noon() - Duration::days(2));
        let today = with_status(
            NotificationRecord::pending(&sleep, noon()),
            NotificationStatus::Suppressed,
        );
        ledger.insert(earlier.clone());
        ledger.insert(today.clone());
        ledger.insert(record("ana", SourceService::Reminders, noon()));

        let offset = FixedOffset::east_opt(0).expect("offset");
        let week = DayWindow::trailing(noon(), offset, 7);
        let history = ledger
            .get_history("ana", &week, Some("sleep"))
            .await
            .expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, today.id);
        assert_eq!(history[1].id, earlier.id);

        let counts = ledger.count_by_status_today(&scope("ana")).await.expect("counts");
        assert_eq!(counts.get(&NotificationStatus::Suppressed), Some(&1));
        assert_eq!(counts.get(&NotificationStatus::Pending), Some(&1));
        assert_eq!(counts.get(&NotificationStatus::Sent), None);

        assert_eq!(ledger.get_today(&scope("ana")).await.expect("today").len(), 2);
    }
}
