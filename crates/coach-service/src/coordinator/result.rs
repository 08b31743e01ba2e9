//! Values returned to producers and operators.

use serde::{Deserialize, Serialize};

use coach_core::types::{DayWindow, NotificationId};
use coach_entity::notification::{NotificationStatus, SourceService};

/// Outcome of `NotificationCoordinator::send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    /// Dispatched and at least one device reached.
    pub success: bool,
    /// Ledger record id; `None` when recording failed.
    pub notification_id: Option<NotificationId>,
    /// Denied by policy.
    pub suppressed: bool,
    pub suppression_reason: Option<String>,
    /// Allowed but not delivered, or rejected before recording.
    pub failure_reason: Option<String>,
    pub delivered_count: u32,
}

impl SendResult {
    pub fn sent(notification_id: Option<NotificationId>, delivered_count: u32) -> Self {
        Self {
            success: true,
            notification_id,
            suppressed: false,
            suppression_reason: None,
            failure_reason: None,
            delivered_count,
        }
    }

    pub fn suppressed(notification_id: Option<NotificationId>, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            notification_id,
            suppressed: true,
            suppression_reason: Some(reason.into()),
            failure_reason: None,
            delivered_count: 0,
        }
    }

    pub fn failed(notification_id: Option<NotificationId>, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            notification_id,
            suppressed: false,
            suppression_reason: None,
            failure_reason: Some(reason.into()),
            delivered_count: 0,
        }
    }
}

/// Count of today's records in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: NotificationStatus,
    pub count: u32,
}

/// Remaining allowance for one producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceQuota {
    pub source: SourceService,
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
}

/// A user's notification budget for the current day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub user_identity: String,
    pub day: DayWindow,
    /// Every status, in lifecycle order, zero counts included.
    pub status_counts: Vec<StatusCount>,
    pub global_used: u32,
    pub global_limit: u32,
    pub global_remaining: u32,
    pub sources: Vec<SourceQuota>,
}
