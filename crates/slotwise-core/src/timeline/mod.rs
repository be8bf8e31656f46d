//! Interval algebra over calendar time.
//!
//! This module provides:
//! - Free-time detection as the complement of busy periods in a window
//! - Splitting a free slot after part of it is allocated
//! - An ordered free-slot pool used by the allocator

mod interval;
mod pool;

pub use interval::{
    add_days_saturating, duration_minutes, fits_before, free_slots, local_day, split_after_allocation,
    TimeInterval,
};
pub use pool::FreeSlotPool;
