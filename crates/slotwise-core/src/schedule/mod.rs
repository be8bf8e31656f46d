//! Input types: work items and user history.
//!
//! These are supplied by the caller on every invocation and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Perceived difficulty of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A pending unit of work with an effort estimate and a deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub estimated_effort_minutes: Option<i64>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub weight: Option<f64>,
    /// Owning plan or roadmap, copied onto every block for this item
    #[serde(default)]
    pub container_id: String,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            estimated_effort_minutes: None,
            deadline: None,
            difficulty: None,
            weight: None,
            container_id: String::new(),
        }
    }

    pub fn with_effort(mut self, minutes: i64) -> Self {
        self.estimated_effort_minutes = Some(minutes);
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = container_id.into();
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// Effort and deadline, when the item is open and both are usable.
    ///
    /// Items without a positive effort estimate or without a deadline take
    /// no part in allocation or risk scoring.
    pub fn plannable(&self) -> Option<(i64, DateTime<Utc>)> {
        if self.completed {
            return None;
        }
        let effort = self.estimated_effort_minutes.filter(|m| *m > 0)?;
        Some((effort, self.deadline?))
    }

    /// Plannable and still due after `now`
    pub fn is_allocatable(&self, now: DateTime<Utc>) -> bool {
        self.plannable().is_some_and(|(_, deadline)| deadline > now)
    }

    pub fn is_hard(&self) -> bool {
        self.difficulty == Some(Difficulty::Hard)
    }
}

/// Read-only behavioural history of the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHistory {
    #[serde(default)]
    pub consistency_streak_days: u32,
}

impl UserHistory {
    pub fn with_streak(days: u32) -> Self {
        Self {
            consistency_streak_days: days,
        }
    }
}
