use serde_json::Value;

use crate::error::SchemaError;

/// A named JSON Schema handed to a structured-output provider call.
///
/// The name is used where a backend wants an identifier for the schema
/// (the Anthropic tool name, the OpenAI `json_schema.name`).
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredSchema {
    pub name: String,
    pub json: Value,
}

impl StructuredSchema {
    #[must_use]
    pub fn new(name: impl Into<String>, json: Value) -> Self {
        Self {
            name: name.into(),
            json,
        }
    }

    /// Validate `instance` against this schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Generation` if the schema itself does not compile,
    /// or `SchemaError::ValidationFailed` listing every violation.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaError> {
        validate_against(&self.json, instance)
    }
}

pub(crate) fn validate_against(schema: &Value, instance: &Value) -> Result<(), SchemaError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| SchemaError::Generation(format!("{e}")))?;

    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::ValidationFailed { errors })
    }
}
