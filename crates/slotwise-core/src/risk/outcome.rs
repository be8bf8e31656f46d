//! Aggregate outcome prediction.
//!
//! Turns completion progress and consistency into a 0-100 score and the
//! additional effort needed to reach a target score.

use serde::{Deserialize, Serialize};

use crate::schedule::{UserHistory, WorkItem};

/// Predicted outcome for a set of items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomePrediction {
    /// Score from 0 to 100
    pub score: u8,
    /// Extra hours of work needed to reach the target score
    pub effort_gap_hours: u32,
}

/// Outcome predictor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeConfig {
    #[serde(default = "default_target_score")]
    pub target_score: u8,
    /// Hours of effort assumed per missing score point
    #[serde(default = "default_hours_per_point")]
    pub hours_per_point: f64,
    /// Points deducted per open hard item
    #[serde(default = "default_hard_item_penalty")]
    pub hard_item_penalty: f64,
    /// Upper bound on the streak multiplier
    #[serde(default = "default_max_streak_factor")]
    pub max_streak_factor: f64,
    /// Streak length that adds a full 1.0 to the multiplier (days)
    #[serde(default = "default_streak_ramp_days")]
    pub streak_ramp_days: u32,
}

fn default_target_score() -> u8 {
    95
}
fn default_hours_per_point() -> f64 {
    0.5
}
fn default_hard_item_penalty() -> f64 {
    2.0
}
fn default_max_streak_factor() -> f64 {
    1.2
}
fn default_streak_ramp_days() -> u32 {
    30
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            target_score: default_target_score(),
            hours_per_point: default_hours_per_point(),
            hard_item_penalty: default_hard_item_penalty(),
            max_streak_factor: default_max_streak_factor(),
            streak_ramp_days: default_streak_ramp_days(),
        }
    }
}

/// Outcome predictor
#[derive(Debug, Clone, Default)]
pub struct OutcomePredictor {
    config: OutcomeConfig,
}

impl OutcomePredictor {
    /// Create a new predictor with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: OutcomeConfig) -> Self {
        Self { config }
    }

    /// Predict the outcome score.
    ///
    /// An empty item list scores 100 with no gap.
    pub fn predict(
        &self,
        history: &UserHistory,
        items: &[WorkItem],
        completed_count: usize,
    ) -> OutcomePrediction {
        if items.is_empty() {
            return OutcomePrediction {
                score: 100,
                effort_gap_hours: 0,
            };
        }

        let completion_rate = completed_count as f64 / items.len() as f64;
        let ramp = self.config.streak_ramp_days.max(1) as f64;
        let streak_factor = (1.0 + history.consistency_streak_days as f64 / ramp)
            .min(self.config.max_streak_factor);
        let open_hard = items.iter().filter(|i| !i.completed && i.is_hard()).count();

        let raw = completion_rate * 100.0 * streak_factor
            - self.config.hard_item_penalty * open_hard as f64;
        let score = raw.round().clamp(0.0, 100.0) as u8;

        let missing = self.config.target_score.saturating_sub(score) as f64;
        let effort_gap_hours = (missing * self.config.hours_per_point).ceil().max(0.0) as u32;

        OutcomePrediction {
            score,
            effort_gap_hours,
        }
    }
}

/// Convenience function to predict with default settings
pub fn predict_outcome(
    history: &UserHistory,
    items: &[WorkItem],
    completed_count: usize,
) -> OutcomePrediction {
    OutcomePredictor::new().predict(history, items, completed_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Difficulty;

    fn items(total: usize) -> Vec<WorkItem> {
        (0..total)
            .map(|i| WorkItem::new(format!("t{}", i), "task"))
            .collect()
    }

    #[test]
    fn no_items_is_perfect() {
        let p = predict_outcome(&UserHistory::default(), &[], 0);
        assert_eq!(p, OutcomePrediction { score: 100, effort_gap_hours: 0 });
    }

    #[test]
    fn all_done_with_long_streak_caps_at_100() {
        let done: Vec<WorkItem> = items(4).into_iter().map(WorkItem::completed).collect();
        let p = predict_outcome(&UserHistory::with_streak(45), &done, 4);
        assert_eq!(p.score, 100);
        assert_eq!(p.effort_gap_hours, 0);
    }

    #[test]
    fn half_done_without_streak() {
        // 0.5 * 100 * 1.0 = 50; gap = ceil(45 * 0.5) = 23
        let p = predict_outcome(&UserHistory::default(), &items(4), 2);
        assert_eq!(p.score, 50);
        assert_eq!(p.effort_gap_hours, 23);
    }

    #[test]
    fn streak_boosts_score() {
        // 0.5 * 100 * (1 + 15/30) = 75
        let p = predict_outcome(&UserHistory::with_streak(15), &items(4), 2);
        assert_eq!(p.score, 75);
        assert_eq!(p.effort_gap_hours, 10);
    }

    #[test]
    fn open_hard_items_cost_points() {
        let mut list = items(2);
        list[1] = list[1].clone().with_difficulty(Difficulty::Hard);
        let p = predict_outcome(&UserHistory::default(), &list, 1);
        assert_eq!(p.score, 48);
    }

    #[test]
    fn score_never_goes_negative() {
        let list: Vec<WorkItem> = items(5)
            .into_iter()
            .map(|i| i.with_difficulty(Difficulty::Hard))
            .collect();
        let p = predict_outcome(&UserHistory::default(), &list, 0);
        assert_eq!(p.score, 0);
        assert_eq!(p.effort_gap_hours, 48);
    }
}
