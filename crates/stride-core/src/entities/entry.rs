use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A raw journal note. Immutable once stored.
///
/// When the client supplies an idempotency key it becomes the `id`, so a
/// duplicate submission resolves to the same row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub text: String,
    pub linked_goal_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Reject empty or whitespace-only note text.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` when the text has no visible content.
    pub fn validate_text(text: &str) -> Result<(), CoreError> {
        if text.trim().is_empty() {
            return Err(CoreError::Validation("entry text must not be empty".into()));
        }
        Ok(())
    }

    /// Reject idempotency keys that cannot serve as a row identity.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for blank keys or keys longer than 128 bytes.
    pub fn validate_idempotency_key(key: &str) -> Result<(), CoreError> {
        if key.trim().is_empty() {
            return Err(CoreError::Validation(
                "idempotency key must not be blank".into(),
            ));
        }
        if key.len() > 128 {
            return Err(CoreError::Validation(
                "idempotency key must be at most 128 bytes".into(),
            ));
        }
        Ok(())
    }
}
