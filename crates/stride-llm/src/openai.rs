//! OpenAI Chat Completions with strict `json_schema` response format.

use async_trait::async_trait;
use serde_json::{Value, json};
use stride_core::enums::ProviderKind;
use stride_schema::StructuredSchema;

use crate::error::ProviderError;
use crate::provider::{ModelSettings, StructuredModel, build_http_client, extract_json, post_json};

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Model families that reject a `temperature` parameter.
const REASONING_PREFIXES: [&str; 4] = ["o1", "o3", "o4", "gpt-5"];

pub struct OpenAiModel {
    settings: ModelSettings,
    client: reqwest::Client,
}

impl OpenAiModel {
    /// # Errors
    ///
    /// Returns `ProviderError::MissingCredential` for an empty key, or
    /// `ProviderError::Network` if the HTTP client cannot be built.
    pub fn new(settings: ModelSettings) -> Result<Self, ProviderError> {
        if settings.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential {
                provider: ProviderKind::OpenAi,
            });
        }
        let client = build_http_client(settings.timeout)?;
        Ok(Self { settings, client })
    }

    fn model_is_reasoning(&self) -> bool {
        let model = self.settings.model.to_ascii_lowercase();
        REASONING_PREFIXES.iter().any(|p| model.starts_with(p))
    }

    fn build_request_body(&self, system: &str, user: &str, schema: &StructuredSchema) -> Value {
        let mut body = json!({
            "model": self.settings.model,
            "max_completion_tokens": self.settings.max_tokens,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "schema": schema.json,
                    "strict": true
                }
            }
        });
        if !self.model_is_reasoning() {
            body["temperature"] = json!(self.settings.temperature);
        }
        body
    }
}

fn message_content(response: &Value) -> Result<&str, ProviderError> {
    let message = &response["choices"][0]["message"];
    if let Some(refusal) = message["refusal"].as_str() {
        return Err(ProviderError::Parse(format!("model refused: {refusal}")));
    }
    message["content"]
        .as_str()
        .ok_or_else(|| ProviderError::Parse("response has no message content".to_string()))
}

#[async_trait]
impl StructuredModel for OpenAiModel {
    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
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
            .post(format!("{}/v1/chat/completions", self.settings.base_url))
            .bearer_auth(&self.settings.api_key);

        let response = post_json(request, &body, ProviderKind::OpenAi).await?;
        let value = extract_json(message_content(&response)?)?;
        schema.validate(&value)?;
        Ok(value)
    }
}
