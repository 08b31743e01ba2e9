//! Policy decisions and their machine-readable reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

use coach_entity::notification::SourceService;

/// Why the policy engine allowed or denied a request.
///
/// `Display` renders the reason string producers and operators see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyReason {
    /// Every check passed.
    Ok,
    /// Critical severity with `bypass_limits`; quota and dedup were skipped.
    CriticalBypass,
    QuietHours,
    GlobalDailyLimit { count: u32, limit: u32 },
    SourceDailyLimit { source: SourceService, count: u32, limit: u32 },
    ThemeAlreadySent,
    CategorySaturation,
    EntityAlreadyNotified,
    CrossSystemThemeConflict,
    CrossSystemEntityConflict,
    /// A ledger query failed; the engine fails closed.
    PolicyUnavailable,
    /// The request failed validation before any check ran.
    InvalidRequest(String),
}

impl PolicyReason {
    /// Whether this reason admits the notification.
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Ok | Self::CriticalBypass)
    }
}

impl fmt::Display for PolicyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::CriticalBypass => write!(f, "critical_bypass"),
            Self::QuietHours => write!(f, "quiet_hours"),
            Self::GlobalDailyLimit { count, limit } => {
                write!(f, "global_daily_limit_reached ({count}/{limit})")
            }
            Self::SourceDailyLimit { source, count, limit } => {
                write!(f, "source_daily_limit_reached ({source}: {count}/{limit})")
            }
            Self::ThemeAlreadySent => write!(f, "theme_already_sent"),
            Self::CategorySaturation => write!(f, "category_saturation"),
            Self::EntityAlreadyNotified => write!(f, "entity_already_notified"),
            Self::CrossSystemThemeConflict => write!(f, "cross_system_theme_conflict"),
            Self::CrossSystemEntityConflict => write!(f, "cross_system_entity_conflict"),
            Self::PolicyUnavailable => write!(f, "policy_unavailable"),
            Self::InvalidRequest(detail) => write!(f, "invalid_request: {detail}"),
        }
    }
}

/// Outcome of `PolicyEngine::can_send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub reason: String,
}

impl Decision {
    /// Build the decision a reason implies.
    pub fn from_reason(reason: &PolicyReason) -> Self {
        Self {
            allowed: reason.is_allow(),
            reason: reason.to_string(),
        }
    }
}

impl From<PolicyReason> for Decision {
    fn from(reason: PolicyReason) -> Self {
        Self::from_reason(&reason)
    }
}
