//! Error taxonomy for analysis and journal operations.

use stride_db::error::DatabaseError;
use stride_llm::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Bad input. Surfaced synchronously, never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced entry (or goal) does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Missing credential or unusable provider setup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Provider call still failing after the per-call retries.
    #[error("provider call failed after {attempts} attempt(s): {source}")]
    ProviderCall {
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    /// The queue dropped a job after its last attempt.
    #[error("analysis of entry {entry_id} abandoned after {attempts} attempt(s)")]
    QueueExhausted { entry_id: String, attempts: u32 },

    /// The job task panicked or was cancelled before returning.
    #[error("analysis of entry {entry_id} aborted: {reason}")]
    JobAborted { entry_id: String, reason: String },

    /// `enqueue` after `shutdown`.
    #[error("analysis queue is shut down")]
    QueueClosed,

    #[error("database error: {0}")]
    Database(DatabaseError),
}

impl AnalysisError {
    /// Whether the queue should schedule another attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderCall { .. } | Self::JobAborted { .. } | Self::Database(_)
        )
    }
}

impl From<DatabaseError> for AnalysisError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => Self::NotFound { entity, id },
            DatabaseError::Validation(msg) => Self::Validation(msg),
            other => Self::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_onto_taxonomy() {
        let err: AnalysisError = DatabaseError::NotFound {
            entity: "entry",
            id: "k1".into(),
        }
        .into();
        assert!(matches!(err, AnalysisError::NotFound { entity: "entry", .. }));
        assert!(!err.is_retryable());

        let err: AnalysisError = DatabaseError::Validation("empty".into()).into();
        assert!(matches!(err, AnalysisError::Validation(_)));

        let err: AnalysisError = DatabaseError::NoResult.into();
        assert!(err.is_retryable());
    }

    #[test]
    fn only_call_abort_and_storage_failures_retry() {
        let call = AnalysisError::ProviderCall {
            attempts: 3,
            source: ProviderError::Network("reset".into()),
        };
        assert!(call.is_retryable());
        let aborted = AnalysisError::JobAborted {
            entry_id: "k1".into(),
            reason: "panicked".into(),
        };
        assert!(aborted.is_retryable());
        assert!(!AnalysisError::Configuration("no key".into()).is_retryable());
        assert!(!AnalysisError::QueueClosed.is_retryable());
    }
}
