//! Deadline risk and outcome prediction.
//!
//! This module provides:
//! - A logistic per-item miss probability with categorical levels and reasons
//! - An aggregate 0-100 outcome score and the effort gap to a target

mod outcome;
mod scorer;

pub use outcome::{predict_outcome, OutcomeConfig, OutcomePrediction, OutcomePredictor};
pub use scorer::{
    logistic, score_risk, RiskConfig, RiskLevel, RiskReason, RiskReport, RiskScorer,
    RiskThresholds, RiskWeights,
};
