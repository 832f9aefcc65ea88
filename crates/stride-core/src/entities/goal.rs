use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::PhaseIntensity;

/// Something the user is tracking.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Time-bounded context that changes what "on track" means for a goal.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Phase {
    pub id: String,
    pub goal_id: String,
    pub name: String,
    pub intensity: PhaseIntensity,
    pub frequency: Option<String>,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Phase {
    /// Whether `day` falls inside this phase's range (open-ended when `ends_on` is `None`).
    #[must_use]
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.starts_on <= day && self.ends_on.is_none_or(|end| day <= end)
    }
}

/// An active goal paired with its currently active phase, if any.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ActiveGoal {
    pub goal: Goal,
    pub phase: Option<Phase>,
}
