//! Query intervals
//!
//! Intervals are rendered as `start/end`, both ends normalized to UTC and
//! formatted with millisecond precision and no zone suffix.

use super::constants::TIME_FORMAT;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::fmt;

/// A half-open time range `[start, end)` in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    /// Start instant (inclusive)
    pub start: DateTime<Utc>,
    /// End instant (exclusive)
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// Create an interval from timestamps in any time zone
    ///
    /// Both ends are converted to UTC. The order of `start` and `end` is not
    /// checked; the store rejects inverted intervals.
    pub fn new<A: TimeZone, B: TimeZone>(start: &DateTime<A>, end: &DateTime<B>) -> Self {
        Self {
            start: start.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
        }
    }

    /// The last N hours, ending now
    ///
    /// Returns `None` when the start would fall outside the representable
    /// time range.
    pub fn last_hours(hours: i64) -> Option<Self> {
        let end = Utc::now();
        let start = end.checked_sub_signed(Duration::try_hours(hours)?)?;
        Some(Self { start, end })
    }

    /// The last N days, ending now
    pub fn last_days(days: i64) -> Option<Self> {
        Self::last_hours(days.checked_mul(24)?)
    }

    /// Get the duration of the interval
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        )
    }
}

/// Render `start/end` after converting both timestamps to UTC
pub fn format_interval<A: TimeZone, B: TimeZone>(start: &DateTime<A>, end: &DateTime<B>) -> String {
    TimeInterval::new(start, end).to_string()
}

/// Whether `raw` has the shape `start/end` with two non-empty halves
pub fn is_well_formed(raw: &str) -> bool {
    match raw.split_once('/') {
        Some((start, end)) => !start.is_empty() && !end.is_empty() && !end.contains('/'),
        None => false,
    }
}
