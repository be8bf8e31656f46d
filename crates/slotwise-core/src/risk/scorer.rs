//! Logistic deadline-miss model.
//!
//! ```text
//! z = intercept + slack*slack_ratio + streak*streak_days + effort*effort_minutes + penalty
//! p = 1 / (1 + e^-z)
//! ```
//!
//! `penalty` applies only when the item owns no block in the schedule.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::{UserHistory, WorkItem};
use crate::scheduler::{minutes_until, ScheduledBlock};

/// Bucketed miss probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket `probability` with the given (exclusive) lower bounds
    pub fn from_probability(probability: f64, thresholds: &RiskThresholds) -> Self {
        if probability > thresholds.high {
            Self::High
        } else if probability > thresholds.medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Why an item carries risk. Reports list reasons in declaration order.
///
/// The serialized code matches [`RiskReason::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskReason {
    #[serde(rename = "not scheduled")]
    NotScheduled,
    #[serde(rename = "tight deadline")]
    TightDeadline,
    #[serde(rename = "low consistency")]
    LowConsistency,
    #[serde(rename = "high effort")]
    HighEffort,
}

impl RiskReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotScheduled => "not scheduled",
            Self::TightDeadline => "tight deadline",
            Self::LowConsistency => "low consistency",
            Self::HighEffort => "high effort",
        }
    }
}

impl std::fmt::Display for RiskReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk assessment for one open item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub item_id: String,
    /// Probability of missing the deadline (0.0 to 1.0)
    pub miss_probability: f64,
    pub risk_level: RiskLevel,
    pub reasons: Vec<RiskReason>,
}

/// Coefficients of the linear term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    #[serde(default = "default_intercept")]
    pub intercept: f64,
    /// Per unit of slack ratio (negative: slack lowers risk)
    #[serde(default = "default_slack")]
    pub slack: f64,
    /// Per day of consistency streak (negative: consistency lowers risk)
    #[serde(default = "default_streak")]
    pub streak: f64,
    /// Per minute of effort
    #[serde(default = "default_effort")]
    pub effort: f64,
    /// Added when the item has no scheduled block
    #[serde(default = "default_unscheduled_penalty")]
    pub unscheduled_penalty: f64,
}

fn default_intercept() -> f64 {
    -2.0
}
fn default_slack() -> f64 {
    -0.8
}
fn default_streak() -> f64 {
    -0.1
}
fn default_effort() -> f64 {
    0.01
}
fn default_unscheduled_penalty() -> f64 {
    2.0
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            intercept: default_intercept(),
            slack: default_slack(),
            streak: default_streak(),
            effort: default_effort(),
            unscheduled_penalty: default_unscheduled_penalty(),
        }
    }
}

/// Probability cut-offs for risk levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_medium")]
    pub medium: f64,
}

fn default_high() -> f64 {
    0.7
}
fn default_medium() -> f64 {
    0.4
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: default_high(),
            medium: default_medium(),
        }
    }
}

/// Risk scorer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub weights: RiskWeights,
    #[serde(default)]
    pub thresholds: RiskThresholds,
    /// Slack ratio below which the deadline counts as tight
    #[serde(default = "default_tight_slack_ratio")]
    pub tight_slack_ratio: f64,
    /// Streak below which consistency counts as low (days)
    #[serde(default = "default_low_streak_days")]
    pub low_streak_days: u32,
    /// Effort above which the item counts as large (minutes)
    #[serde(default = "default_high_effort_minutes")]
    pub high_effort_minutes: i64,
}

fn default_tight_slack_ratio() -> f64 {
    2.0
}
fn default_low_streak_days() -> u32 {
    3
}
fn default_high_effort_minutes() -> i64 {
    120
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            thresholds: RiskThresholds::default(),
            tight_slack_ratio: default_tight_slack_ratio(),
            low_streak_days: default_low_streak_days(),
            high_effort_minutes: default_high_effort_minutes(),
        }
    }
}

/// Standard logistic function, clamped to `[0, 1]`
pub fn logistic(z: f64) -> f64 {
    let p = 1.0 / (1.0 + (-z).exp());
    if p.is_nan() {
        return 1.0;
    }
    p.clamp(0.0, 1.0)
}

/// Per-item deadline-miss scorer
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    config: RiskConfig,
}

impl RiskScorer {
    /// Create a new scorer with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Score every open item that has both an effort estimate and a deadline.
    pub fn score(
        &self,
        history: &UserHistory,
        items: &[WorkItem],
        schedule: &[ScheduledBlock],
        now: DateTime<Utc>,
    ) -> BTreeMap<String, RiskReport> {
        let scheduled: HashSet<&str> = schedule.iter().map(|b| b.item_id.as_str()).collect();

        items
            .iter()
            .filter_map(|item| {
                let (effort, deadline) = item.plannable()?;
                let report = self.score_item(
                    &item.id,
                    effort,
                    deadline,
                    scheduled.contains(item.id.as_str()),
                    history,
                    now,
                );
                Some((item.id.clone(), report))
            })
            .collect()
    }

    /// Score a single item from its features.
    pub fn score_item(
        &self,
        item_id: &str,
        effort_minutes: i64,
        deadline: DateTime<Utc>,
        is_scheduled: bool,
        history: &UserHistory,
        now: DateTime<Utc>,
    ) -> RiskReport {
        let w = &self.config.weights;
        let slack_ratio = minutes_until(now, deadline) as f64 / effort_minutes as f64;
        let streak = history.consistency_streak_days;
        let penalty = if is_scheduled { 0.0 } else { w.unscheduled_penalty };

        let z = w.intercept
            + w.slack * slack_ratio
            + w.streak * streak as f64
            + w.effort * effort_minutes as f64
            + penalty;
        let miss_probability = logistic(z);

        let mut reasons = Vec::new();
        if !is_scheduled {
            reasons.push(RiskReason::NotScheduled);
        }
        if slack_ratio < self.config.tight_slack_ratio {
            reasons.push(RiskReason::TightDeadline);
        }
        if streak < self.config.low_streak_days {
            reasons.push(RiskReason::LowConsistency);
        }
        if effort_minutes > self.config.high_effort_minutes {
            reasons.push(RiskReason::HighEffort);
        }

        RiskReport {
            item_id: item_id.to_string(),
            miss_probability,
            risk_level: RiskLevel::from_probability(miss_probability, &self.config.thresholds),
            reasons,
        }
    }
}

/// Convenience function to score with default settings
pub fn score_risk(
    history: &UserHistory,
    items: &[WorkItem],
    schedule: &[ScheduledBlock],
    now: DateTime<Utc>,
) -> BTreeMap<String, RiskReport> {
    RiskScorer::new().score(history, items, schedule, now)
}
