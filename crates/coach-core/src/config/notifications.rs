//! Admission-control policy configuration.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound for `stale_pending_minutes` (one week).
pub const MAX_STALE_PENDING_MINUTES: u64 = 7 * 24 * 60;

/// Limits, windows, and timeouts enforced by the notification coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Maximum non-suppressed notifications per user per day, all sources.
    #[serde(default = "default_global_limit")]
    pub global_daily_limit: u32,
    /// Maximum non-suppressed notifications per user per day in one category.
    #[serde(default = "default_category_limit")]
    pub category_daily_limit: u32,
    /// Per-source overrides keyed by source name (e.g. `"insights"`).
    /// Sources absent from the map use their built-in default.
    #[serde(default)]
    pub source_daily_limits: HashMap<String, u32>,
    /// Night window during which low-severity notifications are held back.
    #[serde(default)]
    pub quiet_hours: QuietHoursConfig,
    /// Offset of the single reference timezone used for day windows and
    /// quiet hours, in minutes east of UTC.
    #[serde(default)]
    pub reference_utc_offset_minutes: i32,
    /// Upper bound on a single dispatcher call, in milliseconds.
    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout_ms: u64,
    /// Serialize record/decide per user so concurrent producers observe
    /// each other's in-flight records.
    #[serde(default = "default_true")]
    pub serialize_per_user: bool,
    /// Classify title/body into a theme when the producer supplies none.
    #[serde(default)]
    pub auto_classify_theme: bool,
    /// Age after which a `pending` record is considered abandoned.
    #[serde(default = "default_stale_pending")]
    pub stale_pending_minutes: u64,
    /// Cron expression (with seconds) for the stale-pending sweep.
    #[serde(default = "default_reconcile_cron")]
    pub reconcile_cron: String,
}

/// Quiet-hours window in the reference timezone.
///
/// `start_hour` is inclusive and `end_hour` exclusive; a window whose start is
/// after its end wraps midnight (23 → 7 covers 23:00–06:59).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuietHoursConfig {
    /// Whether the quiet-hours check runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// First quiet hour (0–23).
    #[serde(default = "default_quiet_start")]
    pub start_hour: u32,
    /// First hour after the window (0–23).
    #[serde(default = "default_quiet_end")]
    pub end_hour: u32,
}

impl QuietHoursConfig {
    /// Whether `hour` (0–23) falls inside the window.
    pub fn contains_hour(&self, hour: u32) -> bool {
        if !self.enabled {
            return false;
        }
        match self.start_hour.cmp(&self.end_hour) {
            std::cmp::Ordering::Less => hour >= self.start_hour && hour < self.end_hour,
            std::cmp::Ordering::Greater => hour >= self.start_hour || hour < self.end_hour,
            std::cmp::Ordering::Equal => false,
        }
    }
}

impl Default for QuietHoursConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_hour: default_quiet_start(),
            end_hour: default_quiet_end(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            global_daily_limit: default_global_limit(),
            category_daily_limit: default_category_limit(),
            source_daily_limits: HashMap::new(),
            quiet_hours: QuietHoursConfig::default(),
            reference_utc_offset_minutes: 0,
            dispatch_timeout_ms: default_dispatch_timeout(),
            serialize_per_user: true,
            auto_classify_theme: false,
            stale_pending_minutes: default_stale_pending(),
            reconcile_cron: default_reconcile_cron(),
        }
    }
}

impl NotificationsConfig {
    /// The reference timezone as a fixed offset. Falls back to UTC for an
    /// out-of-range value; [`Self::validate`] rejects those at load time.
    pub fn reference_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.reference_utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Dispatcher deadline as a `Duration`.
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }

    /// Stale-pending threshold as a `chrono::Duration`, capped at
    /// [`MAX_STALE_PENDING_MINUTES`].
    pub fn stale_pending_after(&self) -> chrono::Duration {
        let minutes = u32::try_from(self.stale_pending_minutes.min(MAX_STALE_PENDING_MINUTES))
            .unwrap_or(u32::MAX);
        chrono::Duration::minutes(i64::from(minutes))
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.global_daily_limit == 0 {
            return Err(AppError::configuration(
                "notifications.global_daily_limit must be at least 1",
            ));
        }
        if self.quiet_hours.start_hour > 23 || self.quiet_hours.end_hour > 23 {
            return Err(AppError::configuration(
                "notifications.quiet_hours hours must be within 0..=23",
            ));
        }
        if self.reference_utc_offset_minutes.abs() > 14 * 60 {
            return Err(AppError::configuration(format!(
                "notifications.reference_utc_offset_minutes out of range: {}",
                self.reference_utc_offset_minutes
            )));
        }
        if self.dispatch_timeout_ms == 0 {
            return Err(AppError::configuration(
                "notifications.dispatch_timeout_ms must be positive",
            ));
        }
        if self.stale_pending_minutes == 0 || self.stale_pending_minutes > MAX_STALE_PENDING_MINUTES
        {
            return Err(AppError::configuration(format!(
                "notifications.stale_pending_minutes must be within 1..={MAX_STALE_PENDING_MINUTES}"
            )));
        }
        // A record still inside its dispatch deadline must never look abandoned.
        if self.dispatch_timeout_ms >= self.stale_pending_minutes * 60_000 {
            return Err(AppError::configuration(format!(
                "notifications.dispatch_timeout_ms ({}) must be shorter than stale_pending_minutes ({} min)",
                self.dispatch_timeout_ms, self.stale_pending_minutes
            )));
        }
        Ok(())
    }
}

fn default_global_limit() -> u32 {
    6
}

fn default_category_limit() -> u32 {
    2
}

fn default_quiet_start() -> u32 {
    23
}

fn default_quiet_end() -> u32 {
    7
}

fn default_dispatch_timeout() -> u64 {
    10_000
}

fn default_stale_pending() -> u64 {
    15
}

fn default_reconcile_cron() -> String {
    "0 */10 * * * *".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapping_window() {
        let quiet = QuietHoursConfig::default();
        assert!(quiet.contains_hour(23));
        assert!(quiet.contains_hour(0));
        assert!(quiet.contains_hour(2));
        assert!(quiet.contains_hour(6));
        assert!(!quiet.contains_hour(7));
        assert!(!quiet.contains_hour(12));
        assert!(!quiet.contains_hour(22));
    }

    #[test]
    fn test_daytime_window() {
        let quiet = QuietHoursConfig {
            enabled: true,
            start_hour: 13,
            end_hour: 15,
        };
        assert!(!quiet.contains_hour(12));
        assert!(quiet.contains_hour(13));
        assert!(quiet.contains_hour(14));
        assert!(!quiet.contains_hour(15));
    }

    #[test]
    fn test_disabled_or_empty_window() {
        let disabled = QuietHoursConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(!disabled.contains_hour(2));

        let empty = QuietHoursConfig {
            enabled: true,
            start_hour: 5,
            end_hour: 5,
        };
        assert!(!empty.contains_hour(5));
    }

    #[test]
    fn test_reference_offset() {
        let config = NotificationsConfig {
            reference_utc_offset_minutes: -300,
            ..Default::default()
        };
        assert_eq!(config.reference_offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = NotificationsConfig::default();
        assert!(config.validate().is_ok());

        config.global_daily_limit = 0;
        assert!(config.validate().is_err());

        config.global_daily_limit = 6;
        config.quiet_hours.start_hour = 24;
        assert!(config.validate().is_err());

        config.quiet_hours.start_hour = 23;
        config.reference_utc_offset_minutes = 15 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stale_threshold_bounds() {
        let mut config = NotificationsConfig::default();
        assert_eq!(config.stale_pending_after(), chrono::Duration::minutes(15));

        config.stale_pending_minutes = u64::MAX;
        assert!(config.validate().is_err());
        assert_eq!(
            config.stale_pending_after(),
            chrono::Duration::minutes(MAX_STALE_PENDING_MINUTES as i64)
        );

        config.stale_pending_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dispatch_timeout_must_undercut_stale_threshold() {
        let mut config = NotificationsConfig {
            stale_pending_minutes: 1,
            dispatch_timeout_ms: 60_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.dispatch_timeout_ms = 59_999;
        assert!(config.validate().is_ok());
    }
}
