//! # Slotwise Core Library
//!
//! Deadline-aware task allocation and risk scoring. Given pending work items
//! (effort plus deadline) and a calendar of committed time, the engine
//! produces concrete time blocks, per-item deadline-miss risk, and proposals
//! to move scheduled work earlier.
//!
//! Every entry point is a pure function of its inputs. "Now" is always passed
//! in; nothing here reads the clock, touches the network or persists state.
//!
//! ## Architecture
//!
//! - **Timeline**: Free-time complement of busy periods and slot splitting
//! - **Scheduler**: First-fit greedy allocator (single-shot or chunked with a
//!   daily cap) and the earlier-slot reschedule search
//! - **Risk**: Logistic miss-probability model and outcome prediction
//! - **Storage**: TOML configuration for all calibration values
//!
//! ## Key Components
//!
//! - [`GreedyAllocator`]: Assigns items to free slots by urgency
//! - [`RiskScorer`]: Scores deadline-miss probability per item
//! - [`ReschedulePlanner`]: Proposes an earlier slot for one item
//! - [`Planner`]: Validating facade that runs the components together

pub mod error;
pub mod planner;
pub mod risk;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod timeline;
pub mod validation;

pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use planner::{Assessment, PlanRequest, Planner};
pub use risk::{
    predict_outcome, score_risk, OutcomeConfig, OutcomePrediction, OutcomePredictor, RiskConfig,
    RiskLevel, RiskReason, RiskReport, RiskScorer,
};
pub use schedule::{Difficulty, UserHistory, WorkItem};
pub use scheduler::{
    allocate, daily_load, propose_earlier_slot, AllocationMode, AllocatorConfig,
    GreedyAllocator, RescheduleConfig, ReschedulePlanner, RescheduleProposal, ScheduledBlock,
};
pub use storage::Config;
pub use timeline::{duration_minutes, free_slots, split_after_allocation, FreeSlotPool, TimeInterval};
