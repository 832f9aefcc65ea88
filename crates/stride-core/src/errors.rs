//! Cross-cutting error types for Stride.
//!
//! Domain-specific errors (e.g., `DatabaseError`, `ProviderError`) are defined
//! in their respective crates. `CoreError` covers failures that any crate can
//! raise while handling core entities.

use thiserror::Error;

/// Errors that can be raised by any Stride crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (empty text, malformed ids, bad ranges).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
