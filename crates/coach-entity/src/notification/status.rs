//! Notification lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

use coach_core::AppError;

/// Lifecycle state of a ledger record.
///
/// Records start in `Pending` and move exactly once to `Sent`, `Failed`, or
/// `Suppressed`. `Delivered` exists for a device-receipt mechanism that is
/// not wired, so no transition reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// Recorded, decision or dispatch still in flight.
    Pending,
    /// Handed to the dispatcher and reported at least one device.
    Sent,
    /// Confirmed on device. Unreachable.
    Delivered,
    /// Allowed but the dispatch did not succeed.
    Failed,
    /// Denied by the policy engine.
    Suppressed,
}

impl NotificationStatus {
    /// All states, in lifecycle order.
    pub const ALL: [NotificationStatus; 5] = [
        Self::Pending,
        Self::Sent,
        Self::Delivered,
        Self::Failed,
        Self::Suppressed,
    ];

    /// Check if the record is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed | Self::Suppressed)
    }

    /// Whether records in this state count toward quotas and dedup.
    pub fn counts_toward_quota(&self) -> bool {
        !matches!(self, Self::Suppressed)
    }

    /// Whether a record may move from `self` to `next`.
    pub fn can_transition_to(&self, next: NotificationStatus) -> bool {
        matches!(self, Self::Pending) && next.is_terminal()
    }

    /// Reject any transition other than `pending → terminal`.
    pub fn ensure_transition(&self, next: NotificationStatus) -> Result<(), AppError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::conflict(format!(
                "Invalid notification status transition: {self} -> {next}"
            )))
        }
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::Suppressed => "suppressed",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
