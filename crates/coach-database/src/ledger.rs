//! The notification ledger contract.
//!
//! The ledger is the coordinator's only memory: every attempt is appended as
//! a `pending` record, finalized exactly once, and the policy engine answers
//! quota and dedup questions from it.
//!
//! "Today" queries take a [`DayScope`]: the user, the UTC bounds of the
//! current calendar day in the reference timezone, and optionally the id of
//! the in-flight record so it never counts against itself. Quota and dedup
//! queries ignore `suppressed` records.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coach_core::result::AppResult;
use coach_core::types::{DayWindow, NotificationId};
use coach_entity::notification::{NotificationRecord, NotificationStatus, SourceService};

/// `failure_reason` written by the stale-pending sweep.
pub const STALE_PENDING_REASON: &str = "stale_pending";

/// The user and day a quota or dedup query is evaluated over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayScope {
    /// Whose records are counted.
    pub user_identity: String,
    /// The calendar day, as UTC bounds.
    pub window: DayWindow,
    /// A record to leave out of every count, normally the one being decided.
    pub exclude: Option<NotificationId>,
}

impl DayScope {
    pub fn new(user_identity: impl Into<String>, window: DayWindow) -> Self {
        Self {
            user_identity: user_identity.into(),
            window,
            exclude: None,
        }
    }

    /// Leave `id` out of every count.
    pub fn excluding(mut self, id: Option<NotificationId>) -> Self {
        self.exclude = id;
        self
    }

    /// Whether `record` belongs to this scope, regardless of status.
    pub fn covers(&self, record: &NotificationRecord) -> bool {
        record.user_identity == self.user_identity
            && self.window.contains(record.created_at)
            && self.exclude != Some(record.id)
    }

    /// Whether `record` belongs to this scope and counts toward quotas.
    pub fn counts(&self, record: &NotificationRecord) -> bool {
        self.covers(record) && record.counts_toward_quota()
    }
}

/// A terminal status to apply to a `pending` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: NotificationStatus,
    /// Suppression reason for `suppressed`, failure reason for `failed`.
    pub reason: Option<String>,
    /// Devices reached, when the dispatcher reported any.
    pub delivered_count: Option<i32>,
    /// When the transition happened; becomes `sent_at` for `sent`.
    pub at: DateTime<Utc>,
}

impl StatusUpdate {
    pub fn sent(delivered_count: u32, at: DateTime<Utc>) -> Self {
        Self {
            status: NotificationStatus::Sent,
            reason: None,
            delivered_count: Some(i32::try_from(delivered_count).unwrap_or(i32::MAX)),
            at,
        }
    }

    pub fn failed(reason: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: NotificationStatus::Failed,
            reason: Some(reason.into()),
            delivered_count: None,
            at,
        }
    }

    pub fn suppressed(reason: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: NotificationStatus::Suppressed,
            reason: Some(reason.into()),
            delivered_count: None,
            at,
        }
    }

    /// Reason routed to `suppression_reason`.
    pub fn suppression_reason(&self) -> Option<&str> {
        match self.status {
            NotificationStatus::Suppressed => self.reason.as_deref(),
            _ => None,
        }
    }

    /// Reason routed to `failure_reason`.
    pub fn failure_reason(&self) -> Option<&str> {
        match self.status {
            NotificationStatus::Failed => self.reason.as_deref(),
            _ => None,
        }
    }

    /// `sent_at` value implied by this update.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        (self.status == NotificationStatus::Sent).then_some(self.at)
    }

    /// Apply to an in-memory record after the transition has been checked.
    pub fn apply_to(&self, record: &mut NotificationRecord) {
        record.status = self.status;
        record.suppression_reason = self.suppression_reason().map(str::to_string);
        record.failure_reason = self.failure_reason().map(str::to_string);
        if self.delivered_count.is_some() {
            record.delivered_count = self.delivered_count;
        }
        if let Some(sent_at) = self.sent_at() {
            record.sent_at = Some(sent_at);
        }
    }
}

/// Persistence contract for notification records.
#[async_trait]
pub trait NotificationLedger: Send + Sync + std::fmt::Debug + 'static {
    /// Append a `pending` record and return its id.
    async fn record_pending(&self, record: &NotificationRecord) -> AppResult<NotificationId>;

    /// Move a `pending` record to a terminal status.
    ///
    /// Fails with `NotFound` for an unknown id and `Conflict` when the record
    /// is no longer `pending` or the target status is not terminal.
    async fn update_status(&self, id: NotificationId, update: StatusUpdate) -> AppResult<()>;

    /// Non-suppressed records in scope, optionally limited to one source.
    async fn count_today(&self, scope: &DayScope, source: Option<SourceService>) -> AppResult<u32>;

    /// Whether any non-suppressed record in scope carries `theme`.
    async fn was_theme_sent_today(&self, scope: &DayScope, theme: &str) -> AppResult<bool>;

    /// Non-suppressed records in scope with `category`.
    async fn count_category_today(&self, scope: &DayScope, category: &str) -> AppResult<u32>;

    /// Whether a non-suppressed record in scope already covers this entity.
    async fn was_entity_notified_today(
        &self,
        scope: &DayScope,
        entity_type: &str,
        entity_id: &str,
    ) -> AppResult<bool>;

    /// Every record in scope, all statuses, oldest first.
    async fn get_today(&self, scope: &DayScope) -> AppResult<Vec<NotificationRecord>>;

    /// Records for `user_identity` inside `window`, newest first, optionally
    /// limited to one theme.
    async fn get_history(
        &self,
        user_identity: &str,
        window: &DayWindow,
        theme: Option<&str>,
    ) -> AppResult<Vec<NotificationRecord>>;

    /// Look up a single record.
    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<NotificationRecord>>;

    /// Fail every `pending` record created before `older_than`. Returns the
    /// number of records changed.
    async fn fail_stale_pending(&self, older_than: DateTime<Utc>) -> AppResult<u64>;

    /// Records in scope grouped by status, suppressed included.
    async fn count_by_status_today(
        &self,
        scope: &DayScope,
    ) -> AppResult<HashMap<NotificationStatus, u32>>;
}
