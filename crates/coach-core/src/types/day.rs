//! Calendar-day windows in the reference timezone.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Longest span [`DayWindow::trailing`] covers, about ten years.
pub const MAX_TRAILING_DAYS: u32 = 3660;

/// Half-open `[start, end)` UTC interval covering one calendar day of the
/// reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    /// Local midnight, expressed in UTC.
    pub start: DateTime<Utc>,
    /// Next local midnight, expressed in UTC.
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// The day containing `at`, as observed at `offset`.
    pub fn containing(at: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local_date = at.with_timezone(&offset).date_naive();
        let local_midnight = local_date.and_time(NaiveTime::MIN);
        // Fixed offsets have no gaps, so the mapping is always single.
        let start = offset
            .from_local_datetime(&local_midnight)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(at);
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    /// The window spanning the last `days` calendar days up to and including
    /// the day containing `at`. `days` is clamped to `1..=MAX_TRAILING_DAYS`.
    pub fn trailing(at: DateTime<Utc>, offset: FixedOffset, days: u32) -> Self {
        let today = Self::containing(at, offset);
        let span = i64::from(days.clamp(1, MAX_TRAILING_DAYS)) - 1;
        let start = Duration::try_days(span)
            .and_then(|back| today.start.checked_sub_signed(back))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            start,
            end: today.end,
        }
    }

    /// Whether `at` falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Hour of day (0–23) of `at` in the reference timezone.
pub fn local_hour(at: DateTime<Utc>, offset: FixedOffset) -> u32 {
    at.with_timezone(&offset).hour()
}
