use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ActivityLevel;

/// Highest activity level seen for one goal on one UTC day.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DailyActivityRecord {
    pub day: NaiveDate,
    pub goal_id: String,
    pub level: ActivityLevel,
    pub interpretation_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Normalize a timestamp to the UTC calendar day it falls on.
///
/// Interpretations created at different times of the same UTC day map to the
/// same aggregation key.
#[must_use]
pub fn utc_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}
