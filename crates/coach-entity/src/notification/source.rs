//! Producer identities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The subsystem that produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "source_service", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourceService {
    /// Context-driven coaching nudges.
    ProactiveEngagement,
    /// Streak continuation and risk alerts.
    StreakAlerts,
    /// Milestones and badges.
    Achievements,
    /// Trend and pattern insights.
    Insights,
    /// User-scheduled reminders.
    Reminders,
    /// Once-a-day summary.
    DailyDigest,
}

impl SourceService {
    /// All producers.
    pub const ALL: [SourceService; 6] = [
        Self::ProactiveEngagement,
        Self::StreakAlerts,
        Self::Achievements,
        Self::Insights,
        Self::Reminders,
        Self::DailyDigest,
    ];

    /// Built-in per-user daily limit, used when configuration has no override.
    pub fn default_daily_limit(&self) -> u32 {
        match self {
            Self::ProactiveEngagement => 2,
            Self::StreakAlerts => 1,
            Self::Achievements => 3,
            Self::Insights => 2,
            Self::Reminders => 3,
            Self::DailyDigest => 1,
        }
    }

    /// Return the source as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProactiveEngagement => "proactive_engagement",
            Self::StreakAlerts => "streak_alerts",
            Self::Achievements => "achievements",
            Self::Insights => "insights",
            Self::Reminders => "reminders",
            Self::DailyDigest => "daily_digest",
        }
    }
}

impl fmt::Display for SourceService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourceService {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("unknown source service: {s}"))
    }
}
