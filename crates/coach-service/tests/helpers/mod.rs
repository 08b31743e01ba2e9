//! Shared fixtures for coordinator integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use coach_core::config::NotificationsConfig;
use coach_core::error::AppError;
use coach_core::result::AppResult;
use coach_core::traits::FixedClock;
use coach_core::types::{DayWindow, NotificationId};
use coach_database::{DayScope, InMemoryLedger, NotificationLedger, StatusUpdate};
use coach_entity::notification::{
    DeliveryChannel, NotificationRecord, NotificationRequest, NotificationStatus, SourceService,
};
use coach_service::{DispatchError, DispatchPayload, Dispatcher, NotificationCoordinator};

pub const USER: &str = "ana@example.com";

/// 2024-05-14 at `hour`:00 UTC.
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, hour, 0, 0)
        .single()
        .expect("valid time")
}

pub fn request(source: SourceService) -> NotificationRequest {
    NotificationRequest::new(USER, source, "test", "Title", "Body")
}

/// How the recording dispatcher answers.
#[derive(Debug, Clone)]
pub enum Behaviour {
    Deliver(u32),
    Fail(String),
    Hang,
}

/// Dispatcher that records every call.
#[derive(Debug)]
pub struct RecordingDispatcher {
    behaviour: Mutex<Behaviour>,
    calls: Mutex<Vec<(DeliveryChannel, String, DispatchPayload)>>,
}

impl RecordingDispatcher {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour: Mutex::new(behaviour),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, behaviour: Behaviour) {
        *self.behaviour.lock().expect("lock") = behaviour;
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().expect("lock").len()
    }

    pub fn last_payload(&self) -> Option<DispatchPayload> {
        self.calls
            .lock()
            .expect("lock")
            .last()
            .map(|(_, _, payload)| payload.clone())
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch(
        &self,
        channel: DeliveryChannel,
        user_identity: &str,
        payload: &DispatchPayload,
    ) -> Result<u32, DispatchError> {
        self.calls
            .lock()
            .expect("lock")
            .push((channel, user_identity.to_string(), payload.clone()));
        let behaviour = self.behaviour.lock().expect("lock").clone();
        match behaviour {
            Behaviour::Deliver(n) => Ok(n),
            Behaviour::Fail(reason) => Err(DispatchError::Transport(reason)),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(1)
            }
        }
    }
}

/// Ledger whose writes or reads can be made to fail.
#[derive(Debug, Default)]
pub struct FaultyLedger {
    pub inner: InMemoryLedger,
    pub fail_record: bool,
    pub fail_queries: bool,
}

impl FaultyLedger {
    fn query_guard(&self) -> AppResult<()> {
        if self.fail_queries {
            Err(AppError::database("connection reset"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NotificationLedger for FaultyLedger {
    async fn record_pending(&self, record: &NotificationRecord) -> AppResult<NotificationId> {
        if self.fail_record {
            return Err(AppError::database("insert failed"));
        }
        self.inner.record_pending(record).await
    }

    async fn update_status(&self, id: NotificationId, update: StatusUpdate) -> AppResult<()> {
        self.inner.update_status(id, update).await
    }

    async fn count_today(&self, scope: &DayScope, source: Option<SourceService>) -> AppResult<u32> {
        self.query_guard()?;
        self.inner.count_today(scope, source).await
    }

    async fn was_theme_sent_today(&self, scope: &DayScope, theme: &str) -> AppResult<bool> {
        self.query_guard()?;
        self.inner.was_theme_sent_today(scope, theme).await
    }

    async fn count_category_today(&self, scope: &DayScope, category: &str) -> AppResult<u32> {
        self.query_guard()?;
        self.inner.count_category_today(scope, category).await
    }

    async fn was_entity_notified_today(
        &self,
        scope: &DayScope,
        entity_type: &str,
        entity_id: &str,
    ) -> AppResult<bool> {
        self.query_guard()?;
        self.inner
            .was_entity_notified_today(scope, entity_type, entity_id)
            .await
    }

    async fn get_today(&self, scope: &DayScope) -> AppResult<Vec<NotificationRecord>> {
        self.query_guard()?;
        self.inner.get_today(scope).await
    }

    async fn get_history(
        &self,
        user_identity: &str,
        window: &DayWindow,
        theme: Option<&str>,
    ) -> AppResult<Vec<NotificationRecord>> {
        self.inner.get_history(user_identity, window, theme).await
    }

    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<NotificationRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn fail_stale_pending(&self, older_than: DateTime<Utc>) -> AppResult<u64> {
        self.inner.fail_stale_pending(older_than).await
    }

    async fn count_by_status_today(
        &self,
        scope: &DayScope,
    ) -> AppResult<HashMap<NotificationStatus, u32>> {
        self.inner.count_by_status_today(scope).await
    }
}

/// A coordinator wired to an in-memory ledger, a fixed clock, and a
/// recording dispatcher.
pub struct TestApp {
    pub coordinator: Arc<NotificationCoordinator>,
    pub ledger: Arc<InMemoryLedger>,
    pub clock: Arc<FixedClock>,
    pub dispatcher: Arc<RecordingDispatcher>,
}

impl TestApp {
    /// Noon, default policy, every dispatch reaches one device.
    pub fn new() -> Self {
        Self::with(NotificationsConfig::default(), at(12))
    }

    pub fn with(config: NotificationsConfig, now: DateTime<Utc>) -> Self {
        let ledger = Arc::new(InMemoryLedger::new());
        let clock = Arc::new(FixedClock::new(now));
        let dispatcher = Arc::new(RecordingDispatcher::new(Behaviour::Deliver(1)));
        let coordinator = Arc::new(NotificationCoordinator::new(
            ledger.clone(),
            dispatcher.clone(),
            clock.clone(),
            config,
        ));
        Self {
            coordinator,
            ledger,
            clock,
            dispatcher,
        }
    }

    /// Put a record for `request` straight into the ledger with `status`.
    pub fn seed(&self, request: &NotificationRequest, status: NotificationStatus) -> NotificationId {
        let mut record = NotificationRecord::pending(request, at(8));
        record.status = status;
        let id = record.id;
        self.ledger.insert(record);
        id
    }

    pub async fn record(&self, id: NotificationId) -> NotificationRecord {
        self.ledger
            .find_by_id(id)
            .await
            .expect("ledger read")
            .expect("record exists")
    }
}
