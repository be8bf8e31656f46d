//! Urgency ranking for the greedy allocator.
//!
//! Urgency is the slack per unit of work: minutes until the deadline divided
//! by the effort estimate. Lower scores are placed first.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::schedule::WorkItem;

/// Signed whole minutes from `now` until `deadline`; negative once overdue.
pub fn minutes_until(now: DateTime<Utc>, deadline: DateTime<Utc>) -> i64 {
    (deadline - now).num_minutes()
}

/// Minutes until the deadline per minute of effort.
pub fn urgency_score(now: DateTime<Utc>, deadline: DateTime<Utc>, effort_minutes: i64) -> f64 {
    minutes_until(now, deadline) as f64 / effort_minutes as f64
}

/// An allocatable item with its precomputed urgency.
#[derive(Debug, Clone)]
pub struct RankedItem<'a> {
    pub item: &'a WorkItem,
    pub effort_minutes: i64,
    pub deadline: DateTime<Utc>,
    pub urgency: f64,
}

/// Scores closer than `epsilon` are ties and fall back to the item id.
pub fn compare_urgency(a: &RankedItem<'_>, b: &RankedItem<'_>, epsilon: f64) -> Ordering {
    if (a.urgency - b.urgency).abs() < epsilon {
        a.item.id.cmp(&b.item.id)
    } else {
        a.urgency.total_cmp(&b.urgency)
    }
}

/// Allocatable items in placement order.
///
/// The epsilon comparison is not transitive, so it is not handed to
/// `sort_by` directly. Items are first put in a total order by `(score, id)`,
/// then an insertion pass applies the epsilon tie-break. The result depends
/// only on the set of items, not on their input order.
pub fn rank_by_urgency<'a>(
    items: &'a [WorkItem],
    now: DateTime<Utc>,
    epsilon: f64,
) -> Vec<RankedItem<'a>> {
    let mut ranked: Vec<RankedItem<'a>> = items
        .iter()
        .filter(|item| item.is_allocatable(now))
        .filter_map(|item| {
            let (effort_minutes, deadline) = item.plannable()?;
            Some(RankedItem {
                item,
                effort_minutes,
                deadline,
                urgency: urgency_score(now, deadline, effort_minutes),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.urgency
            .total_cmp(&b.urgency)
            .then_with(|| a.item.id.cmp(&b.item.id))
    });

    for i in 1..ranked.len() {
        let mut j = i;
        while j > 0 && compare_urgency(&ranked[j], &ranked[j - 1], epsilon) == Ordering::Less {
            ranked.swap(j, j - 1);
            j -= 1;
        }
    }

    ranked
}
