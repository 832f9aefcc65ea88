use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// No schema registered under this name.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// The instance violated the schema. One message per violation.
    #[error("Validation failed: {}", errors.join("; "))]
    ValidationFailed { errors: Vec<String> },

    /// The schema itself could not be compiled.
    #[error("Schema compilation error: {0}")]
    Generation(String),
}
