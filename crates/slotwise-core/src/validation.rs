//! Boundary checks for caller-supplied inputs.
//!
//! The allocation and scoring code assumes well-formed inputs. Anything that
//! arrives from outside the process should pass through these checks first.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::schedule::WorkItem;
use crate::scheduler::ScheduledBlock;
use crate::timeline::TimeInterval;

/// Every interval must satisfy `start <= end`.
pub fn validate_intervals(intervals: &[TimeInterval]) -> Result<(), ValidationError> {
    for interval in intervals {
        TimeInterval::try_new(interval.start, interval.end)?;
    }
    Ok(())
}

/// Every block must satisfy `start <= end`.
pub fn validate_blocks(blocks: &[ScheduledBlock]) -> Result<(), ValidationError> {
    for block in blocks {
        TimeInterval::try_new(block.start, block.end)?;
    }
    Ok(())
}

/// Item ids must be unique and effort estimates, when present, positive.
pub fn validate_items(items: &[WorkItem]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::DuplicateItemId(item.id.clone()));
        }
        if let Some(minutes) = item.estimated_effort_minutes {
            if minutes <= 0 {
                return Err(ValidationError::NonPositiveEffort {
                    item_id: item.id.clone(),
                    minutes,
                });
            }
        }
        if item.weight.is_some_and(|w| !w.is_finite()) {
            return Err(ValidationError::InvalidValue {
                field: format!("items[{}].weight", item.id),
                message: "must be a finite number".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn reversed_interval_is_rejected() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let bad = TimeInterval {
            start,
            end: start - Duration::minutes(1),
        };
        let err = validate_intervals(&[bad]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimeRange { .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let items = vec![WorkItem::new("a", "A"), WorkItem::new("a", "again")];
        assert_eq!(
            validate_items(&items),
            Err(ValidationError::DuplicateItemId("a".into()))
        );
    }

    #[test]
    fn non_positive_effort_is_rejected() {
        let items = vec![WorkItem::new("a", "A").with_effort(0)];
        assert!(matches!(
            validate_items(&items),
            Err(ValidationError::NonPositiveEffort { minutes: 0, .. })
        ));
    }

    #[test]
    fn missing_effort_is_fine() {
        let items = vec![WorkItem::new("a", "A"), WorkItem::new("b", "B").with_effort(15)];
        assert!(validate_items(&items).is_ok());
    }
}
