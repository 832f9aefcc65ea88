//! Database error types for stride-db.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// A row looked up by id does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Data rejected before it reached SQL.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<stride_schema::SchemaError> for DatabaseError {
    fn from(err: stride_schema::SchemaError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<stride_core::errors::CoreError> for DatabaseError {
    fn from(err: stride_core::errors::CoreError) -> Self {
        match err {
            stride_core::errors::CoreError::Validation(msg) => Self::Validation(msg),
            other => Self::Other(other.into()),
        }
    }
}
