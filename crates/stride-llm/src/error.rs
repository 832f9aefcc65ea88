use stride_core::enums::ProviderKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API key resolved for the backend. A configuration problem, not a
    /// call failure.
    #[error("API key not configured for {provider}")]
    MissingCredential { provider: ProviderKind },

    /// Transport failure: connect, timeout, or a broken response body.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response did not contain a JSON object where one was expected.
    #[error("unparseable response: {0}")]
    Parse(String),

    /// The JSON object did not satisfy the request schema.
    #[error("response failed schema validation: {}", errors.join("; "))]
    Validation { errors: Vec<String> },
}

impl ProviderError {
    /// Whether repeating the same call could succeed.
    ///
    /// Missing credentials and client-side 4xx errors (other than 408 and 429)
    /// will fail identically on every attempt.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::MissingCredential { .. } => false,
            Self::Http { status, .. } => {
                matches!(*status, 408 | 409 | 429) || *status >= 500
            }
            Self::Network(_) | Self::Parse(_) | Self::Validation { .. } => true,
        }
    }
}

impl From<stride_schema::SchemaError> for ProviderError {
    fn from(err: stride_schema::SchemaError) -> Self {
        match err {
            stride_schema::SchemaError::ValidationFailed { errors } => Self::Validation { errors },
            other => Self::Validation {
                errors: vec![other.to_string()],
            },
        }
    }
}
