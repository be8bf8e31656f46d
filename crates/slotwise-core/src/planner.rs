//! One-stop facade over allocation, risk scoring and rescheduling.
//!
//! A [`PlanRequest`] is a snapshot of everything the engine needs: items,
//! committed calendar time, already persisted blocks, history and "now".
//! [`Planner`] validates the snapshot once and runs the components with a
//! shared [`Config`].

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::risk::{OutcomePrediction, OutcomePredictor, RiskReport, RiskScorer};
use crate::schedule::{UserHistory, WorkItem};
use crate::scheduler::{
    AllocationMode, GreedyAllocator, RescheduleProposal, ReschedulePlanner, ScheduledBlock,
};
use crate::storage::Config;
use crate::timeline::{add_days_saturating, TimeInterval};
use crate::validation::{validate_blocks, validate_intervals, validate_items};

/// Input snapshot for one engine invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub now: DateTime<Utc>,
    /// End of the allocation window; defaults to `now + allocator.horizon_days`
    #[serde(default)]
    pub horizon_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<WorkItem>,
    /// Calendar time not owned by any item
    #[serde(default)]
    pub busy: Vec<TimeInterval>,
    /// Blocks already committed in the caller's store
    #[serde(default)]
    pub schedule: Vec<ScheduledBlock>,
    #[serde(default)]
    pub mode: AllocationMode,
    #[serde(default)]
    pub history: UserHistory,
}

impl PlanRequest {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            horizon_end: None,
            items: Vec::new(),
            busy: Vec::new(),
            schedule: Vec::new(),
            mode: AllocationMode::default(),
            history: UserHistory::default(),
        }
    }

    /// Check the snapshot for caller bugs.
    pub fn validate(&self) -> Result<()> {
        validate_items(&self.items)?;
        validate_intervals(&self.busy)?;
        validate_blocks(&self.schedule)?;
        if let Some(end) = self.horizon_end {
            TimeInterval::try_new(self.now, end)?;
        }
        Ok(())
    }
}

/// Everything a dashboard needs for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Newly allocated blocks
    pub blocks: Vec<ScheduledBlock>,
    pub risks: BTreeMap<String, RiskReport>,
    pub outcome: OutcomePrediction,
}

/// Engine facade
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: Config,
}

impl Planner {
    /// Create a new planner with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Allocate items that do not yet own a committed block.
    ///
    /// Committed blocks count as busy time alongside `request.busy`.
    pub fn plan(&self, request: &PlanRequest) -> Result<Vec<ScheduledBlock>> {
        request.validate()?;
        Ok(self.allocate(request))
    }

    /// Allocate, then score risk and predict the outcome.
    ///
    /// Risk sees both the committed blocks and the fresh ones.
    pub fn assess(&self, request: &PlanRequest) -> Result<Assessment> {
        request.validate()?;
        let blocks = self.allocate(request);

        let combined: Vec<ScheduledBlock> =
            request.schedule.iter().chain(blocks.iter()).cloned().collect();
        let risks = RiskScorer::with_config(self.config.risk.clone()).score(
            &request.history,
            &request.items,
            &combined,
            request.now,
        );

        let completed = request.items.iter().filter(|i| i.completed).count();
        let outcome = OutcomePredictor::with_config(self.config.outcome.clone()).predict(
            &request.history,
            &request.items,
            completed,
        );

        Ok(Assessment {
            blocks,
            risks,
            outcome,
        })
    }

    /// Search an earlier slot for `item_id`.
    ///
    /// Unknown items and items without effort or deadline yield `Ok(None)`.
    pub fn propose(&self, item_id: &str, request: &PlanRequest) -> Result<Option<RescheduleProposal>> {
        request.validate()?;
        let Some(item) = request.items.iter().find(|i| i.id == item_id) else {
            debug!(item = item_id, "unknown item, nothing to propose");
            return Ok(None);
        };
        let Some((effort, deadline)) = item.plannable() else {
            return Ok(None);
        };

        let planner = ReschedulePlanner::with_config(self.config.reschedule.clone())
            .with_utc_offset(self.config.allocator.utc_offset_minutes);
        Ok(planner.propose(
            item_id,
            effort,
            deadline,
            &request.schedule,
            &request.busy,
            request.now,
        ))
    }

    fn allocate(&self, request: &PlanRequest) -> Vec<ScheduledBlock> {
        let horizon_end = request
            .horizon_end
            .unwrap_or_else(|| add_days_saturating(request.now, self.config.allocator.horizon_days));

        let placed: HashSet<&str> = request.schedule.iter().map(|b| b.item_id.as_str()).collect();
        let pending: Vec<WorkItem> = request
            .items
            .iter()
            .filter(|i| !placed.contains(i.id.as_str()))
            .cloned()
            .collect();

        let busy: Vec<TimeInterval> = request
            .busy
            .iter()
            .copied()
            .chain(request.schedule.iter().map(ScheduledBlock::interval))
            .collect();

        GreedyAllocator::with_config(self.config.allocator.clone()).allocate(
            &pending,
            &busy,
            request.now,
            horizon_end,
            request.mode,
        )
    }
}
