use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ActivityLevel, MomentumSignal, ProviderKind, ReframeKind};

/// Structured analysis of one entry. Append-only: reanalysis adds a new row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Interpretation {
    pub id: String,
    pub entry_id: String,
    /// Backend that produced the analysis. `None` when no goal was active
    /// and no provider was called.
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub goal_activity: BTreeMap<String, ActivityLevel>,
    pub momentum: MomentumSignal,
    pub risk_flags: Vec<String>,
    pub suggestion: Option<String>,
    pub reframe: Option<Reframe>,
    pub created_at: DateTime<Utc>,
}

impl Interpretation {
    /// Goals with a detected (non-`none`) level, in id order.
    pub fn detected_activity(&self) -> impl Iterator<Item = (&str, ActivityLevel)> {
        self.goal_activity
            .iter()
            .filter(|(_, level)| level.is_detected())
            .map(|(goal, level)| (goal.as_str(), *level))
    }
}

/// Suggestion that a goal itself needs reconsidering.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Reframe {
    pub kind: ReframeKind,
    pub goal_id: Option<String>,
    pub reason: String,
    pub suggestion: String,
}
