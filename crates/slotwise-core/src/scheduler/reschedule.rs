//! Earlier-slot search for an already scheduled item.
//!
//! The item's own blocks are treated as free time, everything else as busy.
//! A proposal is only produced when it actually moves the item earlier; the
//! caller decides whether to apply it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ScheduledBlock;
use crate::timeline::{add_days_saturating, fits_before, free_slots, TimeInterval};

/// A suggested replacement for an item's current block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleProposal {
    pub item_id: String,
    pub original_block: Option<ScheduledBlock>,
    pub proposed_block: ScheduledBlock,
    pub reason: String,
}

/// Reschedule search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescheduleConfig {
    /// How far past `now` to look for free time (days)
    #[serde(default = "default_search_days")]
    pub search_days: i64,
    /// Explanation attached to every proposal
    #[serde(default = "default_reason")]
    pub reason: String,
}

fn default_search_days() -> i64 {
    7
}
fn default_reason() -> String {
    "found earlier available slot to reduce failure risk".into()
}

impl Default for RescheduleConfig {
    fn default() -> Self {
        Self {
            search_days: default_search_days(),
            reason: default_reason(),
        }
    }
}

/// Finds earlier feasible slots for scheduled items
#[derive(Debug, Clone, Default)]
pub struct ReschedulePlanner {
    config: RescheduleConfig,
    utc_offset_minutes: i32,
}

impl ReschedulePlanner {
    /// Create a new planner with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: RescheduleConfig) -> Self {
        Self {
            config,
            utc_offset_minutes: 0,
        }
    }

    /// Offset used to derive the proposed block's day
    pub fn with_utc_offset(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Look for a slot that finishes `item_id` earlier than its current block.
    ///
    /// # Arguments
    /// * `item_id` - Item to move
    /// * `effort_minutes` - Size of the block to place
    /// * `deadline` - Latest allowed end of the proposed block
    /// * `schedule` - Committed blocks, including the item's own
    /// * `external_busy` - Calendar time not owned by any item
    /// * `now` - Start of the search window
    ///
    /// # Returns
    /// `None` when no strictly earlier, feasible slot exists.
    pub fn propose(
        &self,
        item_id: &str,
        effort_minutes: i64,
        deadline: DateTime<Utc>,
        schedule: &[ScheduledBlock],
        external_busy: &[TimeInterval],
        now: DateTime<Utc>,
    ) -> Option<RescheduleProposal> {
        if effort_minutes <= 0 {
            return None;
        }

        let original = schedule
            .iter()
            .filter(|b| b.item_id == item_id)
            .min_by_key(|b| b.start)
            .cloned();

        let busy: Vec<TimeInterval> = external_busy
            .iter()
            .copied()
            .chain(
                schedule
                    .iter()
                    .filter(|b| b.item_id != item_id)
                    .map(ScheduledBlock::interval),
            )
            .collect();

        let window_end = add_days_saturating(now, self.config.search_days);

        for slot in free_slots(&busy, now, window_end) {
            if !fits_before(slot.start, effort_minutes, deadline) {
                break;
            }
            if !slot.can_fit(effort_minutes) {
                continue;
            }
            if let Some(current) = &original {
                if slot.start == current.start {
                    debug!(item = item_id, "only candidate is the current slot");
                    continue;
                }
                if slot.start > current.start {
                    break;
                }
            }

            let container_id = original
                .as_ref()
                .map(|b| b.container_id.clone())
                .unwrap_or_default();
            let proposed_block = ScheduledBlock::new(
                item_id,
                container_id,
                TimeInterval::starting_at(slot.start, effort_minutes),
                self.utc_offset_minutes,
            );
            debug!(item = item_id, start = %proposed_block.start, "proposing earlier slot");
            return Some(RescheduleProposal {
                item_id: item_id.to_string(),
                original_block: original,
                proposed_block,
                reason: self.config.reason.clone(),
            });
        }

        None
    }
}

/// Convenience function to search with default settings
pub fn propose_earlier_slot(
    item_id: &str,
    effort_minutes: i64,
    deadline: DateTime<Utc>,
    schedule: &[ScheduledBlock],
    external_busy: &[TimeInterval],
    now: DateTime<Utc>,
) -> Option<RescheduleProposal> {
    ReschedulePlanner::new().propose(item_id, effort_minutes, deadline, schedule, external_busy, now)
}
