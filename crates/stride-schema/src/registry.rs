//! Registry of the persisted entity schemas.
//!
//! Built once from `stride-core` types via [`schemars::schema_for!`].

use std::collections::HashMap;

use schemars::schema_for;

use crate::error::SchemaError;
use crate::structured::validate_against;

pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert(
            $name,
            serde_json::to_value(schema_for!($ty)).unwrap_or_default(),
        );
    };
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        register!(schemas, "entry", stride_core::entities::Entry);
        register!(
            schemas,
            "interpretation",
            stride_core::entities::Interpretation
        );
        register!(
            schemas,
            "daily_activity_record",
            stride_core::entities::DailyActivityRecord
        );
        register!(schemas, "goal", stride_core::entities::Goal);
        register!(schemas, "phase", stride_core::entities::Phase);
        register!(schemas, "active_goal", stride_core::entities::ActiveGoal);

        Self { schemas }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;
        validate_against(schema, instance)
    }

    /// Registered schema names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use stride_core::entities::{Interpretation, Reframe};
    use stride_core::enums::{ActivityLevel, MomentumSignal, ProviderKind, ReframeKind};

    fn interpretation() -> Interpretation {
        Interpretation {
            id: "int-0000abcd".into(),
            entry_id: "k1".into(),
            provider: Some(ProviderKind::Gemini),
            model: Some("gemini-2.5-flash".into()),
            goal_activity: BTreeMap::from([("gol-00000001".to_string(), ActivityLevel::Full)]),
            momentum: MomentumSignal::High,
            risk_flags: vec![],
            suggestion: None,
            reframe: Some(Reframe {
                kind: ReframeKind::Pause,
                goal_id: None,
                reason: "travel week".into(),
                suggestion: "pick it back up Monday".into(),
            }),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn lists_entity_schemas_sorted() {
        let reg = SchemaRegistry::new();
        assert_eq!(
            reg.list(),
            vec![
                "active_goal",
                "daily_activity_record",
                "entry",
                "goal",
                "interpretation",
                "phase"
            ]
        );
    }

    #[test]
    fn interpretation_validates() {
        let reg = SchemaRegistry::new();
        let json = serde_json::to_value(interpretation()).unwrap();
        assert!(reg.validate("interpretation", &json).is_ok());
    }

    #[test]
    fn unknown_activity_level_fails() {
        let reg = SchemaRegistry::new();
        let mut json = serde_json::to_value(interpretation()).unwrap();
        json["goal_activity"]["gol-00000001"] = serde_json::json!("most");
        let result = reg.validate("interpretation", &json);
        assert!(matches!(result, Err(SchemaError::ValidationFailed { .. })));
    }

    #[test]
    fn missing_schema_is_not_found() {
        let reg = SchemaRegistry::new();
        let result = reg.validate("task", &serde_json::json!({}));
        assert!(matches!(result, Err(SchemaError::NotFound(_))));
    }
}
