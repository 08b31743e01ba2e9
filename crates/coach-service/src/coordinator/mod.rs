//! Notification orchestration.
//!
//! [`NotificationCoordinator::send`] is the only way a producer gets a
//! message to a device:
//!
//! 1. record a `pending` row
//! 2. ask the policy engine
//! 3. on denial, mark the row `suppressed`
//! 4. on allow, dispatch with a deadline and mark it `sent` or `failed`
//!
//! Steps 1–3 run under a per-user lock so concurrent producers see each
//! other's pending rows. The lock is released before dispatch.

pub mod locks;
pub mod result;

use std::sync::Arc;

use chrono::Duration;
use tracing::{error, info, instrument, warn};

use coach_core::config::NotificationsConfig;
use coach_core::error::AppError;
use coach_core::result::AppResult;
use coach_core::traits::Clock;
use coach_core::types::{DayWindow, NotificationId};
use coach_database::ledger::{NotificationLedger, StatusUpdate};
use coach_entity::notification::{
    NotificationRecord, NotificationRequest, NotificationStatus, SourceService, normalize_label,
};

use crate::dispatch::{DispatchPayload, Dispatcher};
use crate::policy::{Decision, PolicyEngine, PolicyReason};
use crate::theme::extract_theme;

pub use locks::UserLocks;
pub use result::{DailySummary, SendResult, SourceQuota, StatusCount};

/// `failure_reason` when the dispatcher did not answer in time.
pub const DISPATCH_TIMEOUT_REASON: &str = "dispatch_timeout";
/// `failure_reason` when the dispatcher reached no device.
pub const NO_DEVICES_REASON: &str = "no_devices_reached";

/// Central admission gate shared by every producer.
#[derive(Debug)]
pub struct NotificationCoordinator {
    ledger: Arc<dyn NotificationLedger>,
    dispatcher: Arc<dyn Dispatcher>,
    clock: Arc<dyn Clock>,
    policy: PolicyEngine,
    locks: UserLocks,
    config: NotificationsConfig,
}

impl NotificationCoordinator {
    pub fn new(
        ledger: Arc<dyn NotificationLedger>,
        dispatcher: Arc<dyn Dispatcher>,
        clock: Arc<dyn Clock>,
        config: NotificationsConfig,
    ) -> Self {
        let policy = PolicyEngine::new(ledger.clone(), clock.clone(), config.clone());
        Self {
            ledger,
            dispatcher,
            clock,
            policy,
            locks: UserLocks::new(),
            config,
        }
    }

    /// The policy engine this coordinator consults.
    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    /// Record, decide, dispatch, finalize. Never fails: every outcome is
    /// described by the returned [`SendResult`].
    #[instrument(
        skip(self, request),
        fields(user = %request.user_identity, source = %request.source_service)
    )]
    pub async fn send(&self, request: NotificationRequest) -> SendResult {
        if let Err(e) = request.validate() {
            warn!(error = %e.message, "Rejected invalid notification request");
            return SendResult::failed(None, PolicyReason::InvalidRequest(e.message).to_string());
        }

        let request = self.with_auto_theme(request);

        let guard = if self.config.serialize_per_user {
            Some(self.locks.acquire(&request.user_identity).await)
        } else {
            None
        };

        let record = NotificationRecord::pending(&request, self.clock.now());
        let notification_id = match self.ledger.record_pending(&record).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!(error = %e, "Failed to record pending notification, continuing unrecorded");
                None
            }
        };

        let decision = self.policy.can_send(&request, notification_id).await;
        if !decision.allowed {
            self.finalize(notification_id, StatusUpdate::suppressed(&decision.reason, self.clock.now()))
                .await;
            drop(guard);
            self.locks.prune();
            info!(reason = %decision.reason, "Notification suppressed");
            return SendResult::suppressed(notification_id, decision.reason);
        }

        drop(guard);
        self.locks.prune();

        let payload = DispatchPayload::from_record(&record);
        let outcome = tokio::time::timeout(
            self.config.dispatch_timeout(),
            self.dispatcher
                .dispatch(request.channel, &request.user_identity, &payload),
        )
        .await;

        let result = match outcome {
            Ok(Ok(0)) => SendResult::failed(notification_id, NO_DEVICES_REASON),
            Ok(Ok(delivered)) => SendResult::sent(notification_id, delivered),
            Ok(Err(e)) => SendResult::failed(notification_id, e.to_string()),
            Err(_) => SendResult::failed(notification_id, DISPATCH_TIMEOUT_REASON),
        };

        let now = self.clock.now();
        let update = match &result.failure_reason {
            Some(reason) => {
                warn!(reason = %reason, "Notification dispatch failed");
                StatusUpdate::failed(reason, now)
            }
            None => {
                info!(delivered = result.delivered_count, reason = %decision.reason, "Notification sent");
                StatusUpdate::sent(result.delivered_count, now)
            }
        };
        self.finalize(notification_id, update).await;

        result
    }

    /// Run the policy engine without recording or dispatching anything.
    pub async fn explain(&self, request: &NotificationRequest) -> Decision {
        if let Err(e) = request.validate() {
            return PolicyReason::InvalidRequest(e.message).into();
        }
        let request = self.with_auto_theme(request.clone());
        self.policy.can_send(&request, None).await
    }

    /// Records for `user_identity` over the last `days` calendar days,
    /// newest first.
    pub async fn history(
        &self,
        user_identity: &str,
        days: u32,
        theme: Option<&str>,
    ) -> AppResult<Vec<NotificationRecord>> {
        let window = DayWindow::trailing(self.clock.now(), self.config.reference_offset(), days);
        let theme = theme.map(normalize_label);
        self.ledger
            .get_history(user_identity, &window, theme.as_deref())
            .await
    }

    /// Every record for `user_identity` today, all statuses, oldest first.
    pub async fn today(&self, user_identity: &str) -> AppResult<Vec<NotificationRecord>> {
        self.ledger
            .get_today(&self.policy.day_scope(user_identity, None))
            .await
    }

    /// Today's status breakdown and remaining allowances for `user_identity`.
    pub async fn daily_summary(&self, user_identity: &str) -> AppResult<DailySummary> {
        let scope = self.policy.day_scope(user_identity, None);
        let by_status = self.ledger.count_by_status_today(&scope).await?;

        let status_counts = NotificationStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: by_status.get(&status).copied().unwrap_or(0),
            })
            .collect();

        let global_used = self.ledger.count_today(&scope, None).await?;
        let global_limit = self.policy.global_limit();

        let mut sources = Vec::with_capacity(SourceService::ALL.len());
        for source in SourceService::ALL {
            let used = self.ledger.count_today(&scope, Some(source)).await?;
            let limit = self.policy.source_limit(source);
            sources.push(SourceQuota {
                source,
                used,
                limit,
                remaining: limit.saturating_sub(used),
            });
        }

        Ok(DailySummary {
            user_identity: user_identity.to_string(),
            day: scope.window,
            status_counts,
            global_used,
            global_limit,
            global_remaining: global_limit.saturating_sub(global_used),
            sources,
        })
    }

    /// Fail `pending` records older than `older_than`.
    pub async fn reconcile_stale(&self, older_than: Duration) -> AppResult<u64> {
        if older_than <= Duration::zero() {
            return Err(AppError::validation(format!(
                "stale threshold must be positive, got {older_than}"
            )));
        }
        let cutoff = self.clock.now().checked_sub_signed(older_than).ok_or_else(|| {
            AppError::validation(format!("stale threshold out of range: {older_than}"))
        })?;
        let changed = self.ledger.fail_stale_pending(cutoff).await?;
        if changed > 0 {
            warn!(count = changed, cutoff = %cutoff, "Failed stale pending notifications");
        }
        Ok(changed)
    }

    fn with_auto_theme(&self, mut request: NotificationRequest) -> NotificationRequest {
        if self.config.auto_classify_theme && request.theme().is_none() {
            let theme = extract_theme(&request.title, &request.body);
            if !theme.is_general() {
                request.theme = Some(theme.as_str().to_string());
            }
        }
        request
    }

    async fn finalize(&self, id: Option<NotificationId>, update: StatusUpdate) {
        let Some(id) = id else {
            return;
        };
        let status = update.status;
        if let Err(e) = self.ledger.update_status(id, update).await {
            error!(notification_id = %id, status = %status, error = %e, "Failed to finalize notification");
        }
    }
}
