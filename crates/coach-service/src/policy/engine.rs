//! The policy engine.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. quiet hours
//! 2. global daily cap
//! 3. per-source daily cap
//! 4. theme dedup
//! 5. category saturation
//! 6. entity dedup
//! 7. cross-system conflict sweep
//!
//! A `critical` request with `bypass_limits` skips 2–7. Quiet hours always
//! run. Any ledger error denies with `policy_unavailable`.

use std::sync::Arc;

use tracing::{debug, error};

use coach_core::config::NotificationsConfig;
use coach_core::result::AppResult;
use coach_core::traits::Clock;
use coach_core::types::{DayWindow, NotificationId, local_hour};
use coach_database::ledger::{DayScope, NotificationLedger};
use coach_entity::notification::{NotificationRequest, SourceService, normalize_label};

use super::decision::{Decision, PolicyReason};

/// Decides whether a request may be dispatched.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    ledger: Arc<dyn NotificationLedger>,
    clock: Arc<dyn Clock>,
    config: NotificationsConfig,
}

impl PolicyEngine {
    pub fn new(
        ledger: Arc<dyn NotificationLedger>,
        clock: Arc<dyn Clock>,
        config: NotificationsConfig,
    ) -> Self {
        Self {
            ledger,
            clock,
            config,
        }
    }

    /// Effective daily limit for `source`: the configured override, else
    /// the built-in default.
    pub fn source_limit(&self, source: SourceService) -> u32 {
        self.config
            .source_daily_limits
            .get(source.as_str())
            .copied()
            .unwrap_or_else(|| source.default_daily_limit())
    }

    /// Global daily limit.
    pub fn global_limit(&self) -> u32 {
        self.config.global_daily_limit
    }

    /// The current day in the reference timezone.
    pub fn today(&self) -> DayWindow {
        DayWindow::containing(self.clock.now(), self.config.reference_offset())
    }

    /// Scope of today's counts for `user_identity`, leaving out `in_flight`.
    pub fn day_scope(&self, user_identity: &str, in_flight: Option<NotificationId>) -> DayScope {
        DayScope::new(user_identity, self.today()).excluding(in_flight)
    }

    /// Evaluate `request`. `in_flight` is the id of the request's own ledger
    /// record, which is never counted against it.
    pub async fn can_send(
        &self,
        request: &NotificationRequest,
        in_flight: Option<NotificationId>,
    ) -> Decision {
        let reason = match self.evaluate(request, in_flight).await {
            Ok(reason) => reason,
            Err(e) => {
                error!(
                    user = %request.user_identity,
                    source = %request.source_service,
                    error = %e,
                    "Policy query failed, denying"
                );
                PolicyReason::PolicyUnavailable
            }
        };

        debug!(
            user = %request.user_identity,
            source = %request.source_service,
            severity = %request.severity,
            reason = %reason,
            "Policy decision"
        );
        Decision::from(reason)
    }

    async fn evaluate(
        &self,
        request: &NotificationRequest,
        in_flight: Option<NotificationId>,
    ) -> AppResult<PolicyReason> {
        if self.in_quiet_hours(request) {
            return Ok(PolicyReason::QuietHours);
        }

        if request.is_critical_bypass() {
            return Ok(PolicyReason::CriticalBypass);
        }

        let scope = self.day_scope(&request.user_identity, in_flight);

        let total = self.ledger.count_today(&scope, None).await?;
        let limit = self.global_limit();
        if total >= limit {
            return Ok(PolicyReason::GlobalDailyLimit {
                count: total,
                limit,
            });
        }

        let source = request.source_service;
        let from_source = self.ledger.count_today(&scope, Some(source)).await?;
        let limit = self.source_limit(source);
        if from_source >= limit {
            return Ok(PolicyReason::SourceDailyLimit {
                source,
                count: from_source,
                limit,
            });
        }

        if let Some(theme) = request.theme_key() {
            if self.ledger.was_theme_sent_today(&scope, &theme).await? {
                return Ok(PolicyReason::ThemeAlreadySent);
            }
        }

        if let Some(category) = request.category() {
            let in_category = self.ledger.count_category_today(&scope, category).await?;
            if in_category >= self.config.category_daily_limit {
                return Ok(PolicyReason::CategorySaturation);
            }
        }

        if let Some((entity_type, entity_id)) = request.entity_key() {
            if self
                .ledger
                .was_entity_notified_today(&scope, &entity_type, &entity_id)
                .await?
            {
                return Ok(PolicyReason::EntityAlreadyNotified);
            }
        }

        self.cross_system_sweep(request, &scope).await
    }

    fn in_quiet_hours(&self, request: &NotificationRequest) -> bool {
        if !(request.severity.respects_quiet_hours() || request.honor_quiet_hours) {
            return false;
        }
        let hour = local_hour(self.clock.now(), self.config.reference_offset());
        self.config.quiet_hours.contains_hour(hour)
    }

    /// Compare against today's history from other producers. Stored labels
    /// are normalized again so rows written before normalization still match.
    async fn cross_system_sweep(
        &self,
        request: &NotificationRequest,
        scope: &DayScope,
    ) -> AppResult<PolicyReason> {
        let theme = request.theme_key();
        let entity = request.entity_key();
        if theme.is_none() && entity.is_none() {
            return Ok(PolicyReason::Ok);
        }

        let today = self.ledger.get_today(scope).await?;
        let others = today
            .iter()
            .filter(|r| r.counts_toward_quota() && r.source_service != request.source_service);

        for record in others {
            if let (Some(wanted), Some(seen)) = (&theme, record.theme.as_deref()) {
                if *wanted == normalize_label(seen) {
                    return Ok(PolicyReason::CrossSystemThemeConflict);
                }
            }
            if let (Some((kind, id)), Some((seen_kind, seen_id))) = (&entity, record.related_entity())
            {
                if *kind == normalize_label(seen_kind) && *id == normalize_label(seen_id) {
                    return Ok(PolicyReason::CrossSystemEntityConflict);
                }
            }
        }

        Ok(PolicyReason::Ok)
    }
}
