//! Greedy deadline-aware allocator.
//!
//! This module assigns work items to free time:
//! - Detects free slots from busy periods between `now` and a horizon
//! - Orders items by urgency (slack per minute of effort)
//! - Places each item in the first slot that fits before its deadline
//! - Optionally splits items into capped chunks spread across days
//!
//! Allocation is first-fit and never backtracks. Work that cannot be placed is
//! simply left without a block.

mod reschedule;
mod urgency;

pub use reschedule::{propose_earlier_slot, ReschedulePlanner, RescheduleConfig, RescheduleProposal};
pub use urgency::{compare_urgency, minutes_until, rank_by_urgency, urgency_score, RankedItem};

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::schedule::WorkItem;
use crate::timeline::{local_day, FreeSlotPool, TimeInterval};

/// A span of calendar time assigned to one work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledBlock {
    pub id: String,
    pub item_id: String,
    pub container_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub assigned_day: NaiveDate,
}

impl ScheduledBlock {
    /// Create a block for `interval`.
    ///
    /// The id is derived from the container, item and start time, so the same
    /// placement always yields the same id.
    pub fn new(
        item_id: impl Into<String>,
        container_id: impl Into<String>,
        interval: TimeInterval,
        utc_offset_minutes: i32,
    ) -> Self {
        let item_id = item_id.into();
        let container_id = container_id.into();
        let key = format!(
            "slotwise:block/{}/{}/{}",
            container_id,
            item_id,
            interval.start.timestamp()
        );
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()).to_string(),
            item_id,
            container_id,
            start: interval.start,
            end: interval.end,
            assigned_day: local_day(interval.start, utc_offset_minutes),
        }
    }

    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start,
            end: self.end,
        }
    }

    /// Get total duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        self.interval().duration_minutes()
    }
}

/// Minutes of scheduled work per assigned day.
pub fn daily_load(blocks: &[ScheduledBlock]) -> BTreeMap<NaiveDate, i64> {
    let mut load = BTreeMap::new();
    for block in blocks {
        *load.entry(block.assigned_day).or_insert(0) += block.duration_minutes();
    }
    load
}

/// How an item's effort is turned into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
    /// One block covering the full effort
    #[default]
    Single,
    /// Pieces of at most `chunk_minutes`, subject to a per-day cap
    Chunked,
}

/// Allocator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Largest piece of work placed at once in chunked mode (minutes)
    #[serde(default = "default_chunk_minutes")]
    pub chunk_minutes: i64,
    /// Work one chunked pass may assign to a single day (minutes)
    #[serde(default = "default_daily_cap_minutes")]
    pub daily_cap_minutes: i64,
    /// Urgency scores closer than this are ordered by item id
    #[serde(default = "default_tie_epsilon")]
    pub tie_epsilon: f64,
    /// Offset used to decide which calendar day a block belongs to
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Planning horizon when the caller does not give one (days)
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
}

fn default_chunk_minutes() -> i64 {
    60
}
fn default_daily_cap_minutes() -> i64 {
    6 * 60
}
fn default_tie_epsilon() -> f64 {
    0.1
}
fn default_horizon_days() -> i64 {
    14
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            chunk_minutes: default_chunk_minutes(),
            daily_cap_minutes: default_daily_cap_minutes(),
            tie_epsilon: default_tie_epsilon(),
            utc_offset_minutes: 0,
            horizon_days: default_horizon_days(),
        }
    }
}

/// First-fit allocator over free calendar time
#[derive(Debug, Clone, Default)]
pub struct GreedyAllocator {
    config: AllocatorConfig,
}

impl GreedyAllocator {
    /// Create a new allocator with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: AllocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Assign items to free time in `[now, horizon_end]`.
    ///
    /// # Arguments
    /// * `items` - Candidate work; completed or unplannable items are skipped
    /// * `busy` - Committed calendar time
    /// * `now` - Start of the allocation window
    /// * `horizon_end` - End of the allocation window
    /// * `mode` - Single block per item, or capped chunks
    ///
    /// # Returns
    /// Blocks in placement order. Items that do not fit have no block.
    pub fn allocate(
        &self,
        items: &[WorkItem],
        busy: &[TimeInterval],
        now: DateTime<Utc>,
        horizon_end: DateTime<Utc>,
        mode: AllocationMode,
    ) -> Vec<ScheduledBlock> {
        let ranked = rank_by_urgency(items, now, self.config.tie_epsilon);
        let mut pool = FreeSlotPool::from_busy(busy, now, horizon_end);
        debug!(
            items = ranked.len(),
            free_slots = pool.len(),
            free_minutes = pool.total_minutes(),
            ?mode,
            "starting allocation pass"
        );

        let mut blocks = Vec::new();
        match mode {
            AllocationMode::Single => {
                for entry in &ranked {
                    self.place_whole(entry, &mut pool, &mut blocks);
                }
            }
            AllocationMode::Chunked => {
                let mut load: HashMap<NaiveDate, i64> = HashMap::new();
                for entry in &ranked {
                    self.place_chunks(entry, &mut pool, &mut load, &mut blocks);
                }
            }
        }

        debug!(blocks = blocks.len(), "allocation pass finished");
        blocks
    }

    fn place_whole(
        &self,
        entry: &RankedItem<'_>,
        pool: &mut FreeSlotPool,
        blocks: &mut Vec<ScheduledBlock>,
    ) {
        let Some(index) = pool.first_fit(entry.effort_minutes, entry.deadline, |_| true) else {
            debug!(item = %entry.item.id, effort = entry.effort_minutes, "no slot before deadline");
            return;
        };
        let taken = pool.consume(index, entry.effort_minutes);
        blocks.push(self.emit(entry.item, taken));
    }

    fn place_chunks(
        &self,
        entry: &RankedItem<'_>,
        pool: &mut FreeSlotPool,
        load: &mut HashMap<NaiveDate, i64>,
        blocks: &mut Vec<ScheduledBlock>,
    ) {
        let chunk_size = self.config.chunk_minutes.max(1);
        let cap = self.config.daily_cap_minutes;
        let offset = self.config.utc_offset_minutes;
        let mut remaining = entry.effort_minutes;

        while remaining > 0 {
            let chunk = remaining.min(chunk_size);
            let found = pool.first_fit(chunk, entry.deadline, |slot| {
                let day = local_day(slot.start, offset);
                load.get(&day).copied().unwrap_or(0) + chunk <= cap
            });
            let Some(index) = found else {
                debug!(
                    item = %entry.item.id,
                    remaining,
                    "chunk left unscheduled"
                );
                return;
            };

            let taken = pool.consume(index, chunk);
            *load.entry(local_day(taken.start, offset)).or_insert(0) += chunk;
            blocks.push(self.emit(entry.item, taken));
            remaining -= chunk;
        }
    }

    fn emit(&self, item: &WorkItem, taken: TimeInterval) -> ScheduledBlock {
        let block = ScheduledBlock::new(
            item.id.clone(),
            item.container_id.clone(),
            taken,
            self.config.utc_offset_minutes,
        );
        trace!(item = %item.id, start = %block.start, end = %block.end, "placed block");
        block
    }
}

/// Convenience function to allocate with default settings
pub fn allocate(
    items: &[WorkItem],
    busy: &[TimeInterval],
    now: DateTime<Utc>,
    horizon_end: DateTime<Utc>,
    mode: AllocationMode,
) -> Vec<ScheduledBlock> {
    GreedyAllocator::new().allocate(items, busy, now, horizon_end, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn at(minutes: i64) -> DateTime<Utc> {
        now() + Duration::minutes(minutes)
    }

    fn make_item(id: &str, effort: i64, due_in_minutes: i64) -> WorkItem {
        WorkItem::new(id, format!("Item {}", id))
            .with_effort(effort)
            .with_deadline(at(due_in_minutes))
            .with_container("plan-1")
    }

    #[test]
    fn single_item_without_busy_starts_now() {
        let items = vec![make_item("1", 60, 120)];
        let blocks = allocate(&items, &[], now(), at(24 * 60), AllocationMode::Single);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start, now());
        assert_eq!(blocks[0].end, at(60));
        assert_eq!(blocks[0].container_id, "plan-1");
        assert_eq!(blocks[0].assigned_day, now().date_naive());
    }

    #[test]
    fn busy_slot_is_avoided() {
        let items = vec![make_item("1", 60, 600)];
        let busy = vec![TimeInterval::new(now(), at(60))];
        let blocks = allocate(&items, &busy, now(), at(24 * 60), AllocationMode::Single);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start, at(60));
    }

    #[test]
    fn oversized_item_is_left_unscheduled() {
        let items = vec![make_item("big", 180, 240)];
        let busy = vec![TimeInterval::new(at(60), at(120))];
        let blocks = allocate(&items, &busy, now(), at(24 * 60), AllocationMode::Single);
        assert!(blocks.is_empty());
    }

    #[test]
    fn slot_ending_past_deadline_is_rejected() {
        let items = vec![make_item("1", 60, 90)];
        let busy = vec![TimeInterval::new(now(), at(45))];
        let blocks = allocate(&items, &busy, now(), at(24 * 60), AllocationMode::Single);
        assert!(blocks.is_empty());
    }

    #[test]
    fn urgent_item_takes_first_slot() {
        let items = vec![make_item("relaxed", 60, 24 * 60), make_item("urgent", 60, 90)];
        let blocks = allocate(&items, &[], now(), at(48 * 60), AllocationMode::Single);
        assert_eq!(blocks[0].item_id, "urgent");
        assert_eq!(blocks[0].start, now());
        assert_eq!(blocks[1].item_id, "relaxed");
        assert_eq!(blocks[1].start, at(60));
    }

    #[test]
    fn first_fit_does_not_backtrack() {
        // "a" grabs the only early slot; "b" would have fit there but not later.
        let items = vec![make_item("a", 60, 100), make_item("b", 60, 100)];
        let blocks = allocate(&items, &[], now(), at(24 * 60), AllocationMode::Single);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].item_id, "a");
    }

    #[test]
    fn chunked_mode_splits_into_hour_pieces() {
        let items = vec![make_item("topic", 150, 24 * 60)];
        let blocks = allocate(&items, &[], now(), at(24 * 60), AllocationMode::Chunked);
        let durations: Vec<i64> = blocks.iter().map(ScheduledBlock::duration_minutes).collect();
        assert_eq!(durations, vec![60, 60, 30]);
        assert_eq!(blocks[1].start, at(60));
        assert_eq!(blocks[2].start, at(120));
    }

    #[test]
    fn chunked_mode_respects_daily_cap() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let night = TimeInterval::new(start + Duration::hours(23), start + Duration::hours(31));
        let items = vec![WorkItem::new("long", "Long")
            .with_effort(8 * 60)
            .with_deadline(start + Duration::days(3))];
        let blocks = allocate(
            &items,
            &[night],
            start,
            start + Duration::days(3),
            AllocationMode::Chunked,
        );

        let load = daily_load(&blocks);
        assert_eq!(load.get(&start.date_naive()), Some(&360));
        let next_day = (start + Duration::days(1)).date_naive();
        assert_eq!(load.get(&next_day), Some(&120));
        assert_eq!(blocks[6].start, start + Duration::hours(31));
    }

    #[test]
    fn capped_day_is_judged_by_slot_start() {
        // One free slot spanning several days starts on a capped day, so the
        // remaining chunks have nowhere to go.
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let items = vec![WorkItem::new("long", "Long")
            .with_effort(8 * 60)
            .with_deadline(start + Duration::days(3))];
        let blocks = allocate(&items, &[], start, start + Duration::days(3), AllocationMode::Chunked);
        assert_eq!(blocks.len(), 6);
    }

    #[test]
    fn chunked_mode_allows_partial_placement() {
        let items = vec![make_item("topic", 180, 150)];
        let blocks = allocate(&items, &[], now(), at(24 * 60), AllocationMode::Chunked);
        let total: i64 = blocks.iter().map(ScheduledBlock::duration_minutes).sum();
        assert_eq!(total, 120);
    }

    #[test]
    fn block_ids_are_stable() {
        let items = vec![make_item("1", 30, 300), make_item("2", 45, 300)];
        let a = allocate(&items, &[], now(), at(600), AllocationMode::Single);
        let b = allocate(&items, &[], now(), at(600), AllocationMode::Single);
        assert_eq!(a, b);
        assert_ne!(a[0].id, a[1].id);
    }

    #[test]
    fn custom_chunk_size_is_used() {
        let allocator = GreedyAllocator::with_config(AllocatorConfig {
            chunk_minutes: 25,
            ..AllocatorConfig::default()
        });
        let items = vec![make_item("1", 50, 300)];
        let blocks = allocator.allocate(&items, &[], now(), at(600), AllocationMode::Chunked);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.duration_minutes() == 25));
    }
}
