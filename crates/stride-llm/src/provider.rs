//! The structured-output trait and the HTTP plumbing shared by every backend.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use stride_core::enums::ProviderKind;
use stride_schema::StructuredSchema;

use crate::error::ProviderError;

/// Longest response body kept in an `Http` error.
const MAX_ERROR_BODY: usize = 2_048;

/// Resolved per-call settings for one backend.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub api_key: String,
    pub model: String,
    /// Endpoint root without a trailing slash, e.g. `https://api.openai.com`.
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[async_trait]
pub trait StructuredModel: Send + Sync {
    fn provider(&self) -> ProviderKind;

    fn model(&self) -> &str;

    /// Generate one JSON object conforming to `schema`.
    ///
    /// The returned value has already passed `schema.validate`.
    async fn generate_structured_object(
        &self,
        system: &str,
        user: &str,
        schema: &StructuredSchema,
    ) -> Result<Value, ProviderError>;
}

/// Map a non-success status to a `ProviderError::Http`, truncating large bodies.
#[must_use]
pub fn parse_http_error(status: u16, body: &str) -> ProviderError {
    let body = if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    } else {
        body.to_string()
    };
    ProviderError::Http { status, body }
}

/// Parse model text as a JSON object, tolerating a surrounding Markdown fence.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the text is not a JSON object.
pub fn extract_json(text: &str) -> Result<Value, ProviderError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let value: Value = serde_json::from_str(unfenced)
        .map_err(|e| ProviderError::Parse(format!("model output is not JSON: {e}")))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ProviderError::Parse(
            "model output is not a JSON object".to_string(),
        ))
    }
}

/// Build a client carrying the call timeout.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {e}")))
}

/// POST a JSON body and return the parsed JSON response.
pub(crate) async fn post_json(
    request: reqwest::RequestBuilder,
    body: &Value,
    provider: ProviderKind,
) -> Result<Value, ProviderError> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    if !(200..300).contains(&status) {
        tracing::debug!(%provider, status, "provider returned error status");
        return Err(parse_http_error(status, &text));
    }

    serde_json::from_str(&text)
        .map_err(|e| ProviderError::Parse(format!("{provider} response envelope: {e}")))
}
