//! Request-time schema for a single entry analysis.
//!
//! The `goal_activity` object is closed over the goal ids active at call
//! time: every id is required and no other key is accepted, so a model that
//! invents or drops a goal fails validation.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Value, json};
use stride_core::entities::Reframe;
use stride_core::enums::{ActivityLevel, MomentumSignal, ReframeKind};

use crate::error::SchemaError;
use crate::structured::StructuredSchema;

pub const ANALYSIS_SCHEMA_NAME: &str = "entry_analysis";

/// Build the analysis schema for the given active goal ids.
///
/// Duplicate ids collapse. The output is deterministic for a given id set.
#[must_use]
pub fn analysis_schema<S: AsRef<str>>(goal_ids: &[S]) -> StructuredSchema {
    let mut ids: Vec<&str> = goal_ids.iter().map(AsRef::as_ref).collect();
    ids.sort_unstable();
    ids.dedup();

    let levels: Vec<&str> = ActivityLevel::ALL.iter().map(|l| l.as_str()).collect();
    let momentum: Vec<&str> = MomentumSignal::ALL.iter().map(|m| m.as_str()).collect();
    let kinds: Vec<&str> = ReframeKind::ALL.iter().map(|k| k.as_str()).collect();

    let properties: serde_json::Map<String, Value> = ids
        .iter()
        .map(|id| ((*id).to_string(), json!({ "type": "string", "enum": levels })))
        .collect();

    let mut goal_id_choices: Vec<Value> = ids.iter().map(|id| json!(id)).collect();
    goal_id_choices.push(Value::Null);

    let schema = json!({
        "type": "object",
        "properties": {
            "goal_activity": {
                "type": "object",
                "description": "Activity level for every listed goal id, and no others.",
                "properties": properties,
                "required": ids,
                "additionalProperties": false
            },
            "momentum": {
                "type": "string",
                "enum": momentum
            },
            "risk_flags": {
                "type": "array",
                "items": { "type": "string" }
            },
            "suggestion": {
                "type": ["string", "null"]
            },
            "reframe": {
                "anyOf": [
                    { "type": "null" },
                    {
                        "type": "object",
                        "properties": {
                            "kind": { "type": "string", "enum": kinds },
                            "goal_id": { "enum": goal_id_choices },
                            "reason": { "type": "string" },
                            "suggestion": { "type": "string" }
                        },
                        "required": ["kind", "goal_id", "reason", "suggestion"],
                        "additionalProperties": false
                    }
                ]
            }
        },
        "required": ["goal_activity", "momentum", "risk_flags", "suggestion", "reframe"],
        "additionalProperties": false
    });

    StructuredSchema::new(ANALYSIS_SCHEMA_NAME, schema)
}

/// Decoded form of a response that passed [`analysis_schema`] validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisOutput {
    pub goal_activity: BTreeMap<String, ActivityLevel>,
    pub momentum: MomentumSignal,
    #[serde(default)]
    pub risk_flags: Vec<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub reframe: Option<Reframe>,
}

impl AnalysisOutput {
    /// Validate `value` against `schema` and decode it.
    ///
    /// Blank suggestions and risk flags are dropped.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` when the value violates the
    /// schema or cannot be decoded.
    pub fn from_validated(schema: &StructuredSchema, value: Value) -> Result<Self, SchemaError> {
        schema.validate(&value)?;
        let mut output: Self =
            serde_json::from_value(value).map_err(|e| SchemaError::ValidationFailed {
                errors: vec![e.to_string()],
            })?;
        output.risk_flags.retain(|flag| !flag.trim().is_empty());
        if output.suggestion.as_deref().is_some_and(|s| s.trim().is_empty()) {
            output.suggestion = None;
        }
        Ok(output)
    }
}
