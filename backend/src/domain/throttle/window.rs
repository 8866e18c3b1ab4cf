//! Temporal window helpers shared by the throttle rules.

use chrono::{DateTime, TimeDelta, Utc};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Whether `at` falls within the `window` ending at `now` (inclusive).
pub(super) fn within_last(at: DateTime<Utc>, now: DateTime<Utc>, window: TimeDelta) -> bool {
    at >= now - window
}

/// Whole hours from `now` until `target`, rounded up and never negative.
pub(super) fn hours_until(target: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let remaining = (target - now).num_milliseconds();
    if remaining <= 0 {
        return 0;
    }
    let hours = remaining / MILLIS_PER_HOUR + i64::from(remaining % MILLIS_PER_HOUR != 0);
    u64::try_from(hours).unwrap_or(u64::MAX)
}

/// Whether at least two of `times` lie `gap` or more apart.
///
/// Two such instants exist exactly when the earliest and latest do.
pub(super) fn spans_at_least(times: &[DateTime<Utc>], gap: TimeDelta) -> bool {
    let earliest = times.iter().min();
    let latest = times.iter().max();
    match (earliest, latest) {
        (Some(earliest), Some(latest)) => *latest - *earliest >= gap,
        _ => false,
    }
}
