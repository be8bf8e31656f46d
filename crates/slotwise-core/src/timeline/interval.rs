//! Interval algebra over calendar time.
//!
//! Busy and free periods share the [`TimeInterval`] shape; what a slot means
//! depends on which list it lives in. All durations are whole minutes.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A half-open span of time `[start, end)` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// Create a new interval
    ///
    /// # Panics
    /// Panics if `end < start`. Use [`try_new`](Self::try_new) for a non-panicking version.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::try_new(start, end).expect("TimeInterval end must not precede start")
    }

    /// Create a new interval, rejecting `end < start`
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Interval of `minutes` starting at `start`
    pub fn starting_at(start: DateTime<Utc>, minutes: i64) -> Self {
        Self::new(start, start + Duration::minutes(minutes))
    }

    /// Get duration in minutes (floored)
    pub fn duration_minutes(&self) -> i64 {
        duration_minutes(self.start, self.end)
    }

    /// Check if this interval can hold `minutes` of work
    pub fn can_fit(&self, minutes: i64) -> bool {
        self.duration_minutes() >= minutes
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the two intervals share a non-empty span
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `instant` lies in `[start, end)`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Whole minutes elapsed from `start` to `end`, rounded down.
///
/// # Panics
/// Panics if `end < start`; a negative duration is a caller bug.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    assert!(end >= start, "negative duration: {start} .. {end}");
    (end - start).num_minutes()
}

/// `start` plus `days`, saturating at the latest representable instant.
pub fn add_days_saturating(start: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// True when `minutes` of work starting at `start` ends no later than `latest_end`.
pub fn fits_before(start: DateTime<Utc>, minutes: i64, latest_end: DateTime<Utc>) -> bool {
    start <= latest_end && duration_minutes(start, latest_end) >= minutes
}

/// Calendar day of `instant` as seen from a fixed UTC offset.
pub fn local_day(instant: DateTime<Utc>, utc_offset_minutes: i32) -> NaiveDate {
    (instant + Duration::minutes(utc_offset_minutes as i64)).date_naive()
}

/// Complement of `busy` within `[window_start, window_end]`.
///
/// Busy intervals may overlap or arrive in any order. The cursor only moves
/// forward, so overlapping intervals collapse into one busy span. Returned
/// slots are ascending, disjoint and never empty.
pub fn free_slots(
    busy: &[TimeInterval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<TimeInterval> {
    if window_end <= window_start {
        return Vec::new();
    }

    let mut clipped: Vec<TimeInterval> = busy
        .iter()
        .filter(|b| b.start < b.end)
        .filter(|b| b.end > window_start && b.start < window_end)
        .map(|b| TimeInterval {
            start: b.start.max(window_start),
            end: b.end.min(window_end),
        })
        .collect();
    clipped.sort_by_key(|b| b.start);

    let mut free = Vec::new();
    let mut cursor = window_start;

    for interval in &clipped {
        if interval.start > cursor {
            free.push(TimeInterval {
                start: cursor,
                end: interval.start,
            });
        }
        if interval.end > cursor {
            cursor = interval.end;
        }
    }

    if cursor < window_end {
        free.push(TimeInterval {
            start: cursor,
            end: window_end,
        });
    }

    free
}

/// Residual free time after `[alloc_start, alloc_end]` is taken out of `slot`.
///
/// Returns the leading remainder (if any) followed by the trailing remainder
/// (if any).
///
/// # Panics
/// Panics unless `slot.start <= alloc_start <= alloc_end <= slot.end`.
pub fn split_after_allocation(
    slot: &TimeInterval,
    alloc_start: DateTime<Utc>,
    alloc_end: DateTime<Utc>,
) -> Vec<TimeInterval> {
    assert!(
        slot.start <= alloc_start && alloc_start <= alloc_end && alloc_end <= slot.end,
        "allocation {alloc_start} .. {alloc_end} lies outside slot {} .. {}",
        slot.start,
        slot.end
    );

    let mut residuals = Vec::with_capacity(2);
    if alloc_start > slot.start {
        residuals.push(TimeInterval {
            start: slot.start,
            end: alloc_start,
        });
    }
    if alloc_end < slot.end {
        residuals.push(TimeInterval {
            start: alloc_end,
            end: slot.end,
        });
    }
    residuals
}
