//! Ordered free-slot collection consumed by one allocation pass.

use chrono::{DateTime, Utc};

use super::interval::{fits_before, free_slots, split_after_allocation, TimeInterval};

/// Free time available to a single allocation pass.
///
/// Slots stay sorted by start and pairwise disjoint. Taking time out of a slot
/// replaces it in place with its residuals, so indices before the consumed
/// slot remain valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeSlotPool {
    slots: Vec<TimeInterval>,
}

impl FreeSlotPool {
    /// Free time left by `busy` inside `[window_start, window_end]`
    pub fn from_busy(
        busy: &[TimeInterval],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Self {
        Self {
            slots: free_slots(busy, window_start, window_end),
        }
    }

    pub fn slots(&self) -> &[TimeInterval] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total free minutes left in the pool
    pub fn total_minutes(&self) -> i64 {
        self.slots.iter().map(TimeInterval::duration_minutes).sum()
    }

    /// Index of the first slot that holds `minutes` of work ending no later
    /// than `latest_end` and passes `accept`.
    ///
    /// The scan visits each slot at most once and stops as soon as a slot
    /// starts too late for the work to finish by `latest_end`.
    pub fn first_fit<F>(&self, minutes: i64, latest_end: DateTime<Utc>, mut accept: F) -> Option<usize>
    where
        F: FnMut(&TimeInterval) -> bool,
    {
        for (index, slot) in self.slots.iter().enumerate() {
            if !fits_before(slot.start, minutes, latest_end) {
                break;
            }
            if !slot.can_fit(minutes) {
                continue;
            }
            if accept(slot) {
                return Some(index);
            }
        }
        None
    }

    /// Take `minutes` from the start of slot `index` and return the taken span.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds or the slot is shorter than `minutes`.
    pub fn consume(&mut self, index: usize, minutes: i64) -> TimeInterval {
        let slot = self.slots[index];
        let taken = TimeInterval::starting_at(slot.start, minutes);
        let residuals = split_after_allocation(&slot, taken.start, taken.end);
        self.slots.splice(index..=index, residuals);
        taken
    }
}
