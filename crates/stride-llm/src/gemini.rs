//! Gemini `generateContent` in JSON mode.
//!
//! The schema is embedded in the prompt rather than sent as
//! `responseSchema`, which accepts only an OpenAPI subset of JSON Schema.
//! The response is validated locally like every other backend.

use async_trait::async_trait;
use serde_json::{Value, json};
use stride_core::enums::ProviderKind;
use stride_schema::StructuredSchema;

use crate::error::ProviderError;
use crate::provider::{ModelSettings, StructuredModel, build_http_client, extract_json, post_json};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiModel {
    settings: ModelSettings,
    client: reqwest::Client,
}

impl GeminiModel {
    /// # Errors
    ///
    /// Returns `ProviderError::MissingCredential` for an empty key, or
    /// `ProviderError::Network` if the HTTP client cannot be built.
    pub fn new(settings: ModelSettings) -> Result<Self, ProviderError> {
        if settings.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential {
                provider: ProviderKind::Gemini,
            });
        }
        let client = build_http_client(settings.timeout)?;
        Ok(Self { settings, client })
    }

    fn build_request_body(&self, system: &str, user: &str, schema: &StructuredSchema) -> Value {
        let prompt = format!(
            "{user}\n\nRespond with a single JSON object that validates against this JSON Schema:\n{}",
            schema.json
        );
        json!({
            "systemInstruction": { "parts": [{ "text": system }] },
            "contents": [
                { "role": "user", "parts": [{ "text": prompt }] }
            ],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": self.settings.temperature,
                "maxOutputTokens": self.settings.max_tokens
            }
        })
    }
}

fn candidate_text(response: &Value) -> Result<String, ProviderError> {
    let text: String = response["candidates"][0]["content"]["parts"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|part| part["text"].as_str())
        .collect();
    if text.trim().is_empty() {
        let reason = response["candidates"][0]["finishReason"]
            .as_str()
            .or_else(|| response["promptFeedback"]["blockReason"].as_str())
            .unwrap_or("unknown");
        return Err(ProviderError::Parse(format!(
            "response has no text (finish reason: {reason})"
        )));
    }
    Ok(text)
}

#[async_trait]
impl StructuredModel for GeminiModel {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn generate_structured_object(
        &self,
        system: &str,
        user: &str,
        schema: &StructuredSchema,
    ) -> Result<Value, ProviderError> {
        let body = self.build_request_body(system, user, schema);
        let request = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.settings.base_url, self.settings.model
            ))
            .header("x-goog-api-key", &self.settings.api_key);

        let response = post_json(request, &body, ProviderKind::Gemini).await?;
        let value = extract_json(&candidate_text(&response)?)?;
        schema.validate(&value)?;
        Ok(value)
    }
}
