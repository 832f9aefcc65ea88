//! Anthropic Messages API with a forced tool call.
//!
//! The request schema becomes the `input_schema` of a single tool and
//! `tool_choice` pins the model to it, so the structured object arrives as
//! the tool call's `input`.

use async_trait::async_trait;
use serde_json::{Value, json};
use stride_core::enums::ProviderKind;
use stride_schema::StructuredSchema;

use crate::error::ProviderError;
use crate::provider::{ModelSettings, StructuredModel, build_http_client, post_json};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicModel {
    settings: ModelSettings,
    client: reqwest::Client,
}

impl AnthropicModel {
    /// # Errors
    ///
    /// Returns `ProviderError::MissingCredential` for an empty key, or
    /// `ProviderError::Network` if the HTTP client cannot be built.
    pub fn new(settings: ModelSettings) -> Result<Self, ProviderError> {
        if settings.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential {
                provider: ProviderKind::Anthropic,
            });
        }
        let client = build_http_client(settings.timeout)?;
        Ok(Self { settings, client })
    }

    fn build_request_body(&self, system: &str, user: &str, schema: &StructuredSchema) -> Value {
        json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "system": system,
            "messages": [
                { "role": "user", "content": user }
            ],
            "tools": [{
                "name": schema.name,
                "description": "Record the structured analysis of the journal entry.",
                "input_schema": schema.json
            }],
            "tool_choice": { "type": "tool", "name": schema.name }
        })
    }
}

/// Pull the `input` of the named `tool_use` block out of a Messages response.
fn tool_input(response: &Value, tool_name: &str) -> Result<Value, ProviderError> {
    response["content"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|block| block["type"] == "tool_use" && block["name"] == tool_name)
        .map(|block| block["input"].clone())
        .filter(Value::is_object)
        .ok_or_else(|| {
            let stop = response["stop_reason"].as_str().unwrap_or("unknown");
            ProviderError::Parse(format!(
                "no '{tool_name}' tool call in response (stop_reason: {stop})"
            ))
        })
}

#[async_trait]
impl StructuredModel for AnthropicModel {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Anthropic
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
            .post(format!("{}/v1/messages", self.settings.base_url))
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", API_VERSION);

        let response = post_json(request, &body, ProviderKind::Anthropic).await?;
        let value = tool_input(&response, &schema.name)?;
        schema.validate(&value)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn model() -> AnthropicModel {
        AnthropicModel::new(ModelSettings {
            api_key: "sk-ant".into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            temperature: 0.2,
            max_tokens: 1024,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn body_forces_the_schema_tool() {
        let schema = StructuredSchema::new("entry_analysis", json!({"type": "object"}));
        let body = model().build_request_body("sys", "note", &schema);
        assert_eq!(body["tool_choice"]["name"], "entry_analysis");
        assert_eq!(body["tools"][0]["input_schema"], json!({"type": "object"}));
        assert_eq!(body["system"], "sys");
        assert!(body.get("temperature").is_some());
    }

    #[test]
    fn tool_input_requires_matching_block() {
        let response = json!({
            "content": [
                { "type": "text", "text": "thinking" },
                { "type": "tool_use", "name": "entry_analysis", "input": { "momentum": "low" } }
            ],
            "stop_reason": "tool_use"
        });
        assert_eq!(
            tool_input(&response, "entry_analysis").unwrap(),
            json!({ "momentum": "low" })
        );
        assert!(tool_input(&response, "other").is_err());
    }

    #[test]
    fn empty_key_is_missing_credential() {
        let result = AnthropicModel::new(ModelSettings {
            api_key: " ".into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            temperature: 0.2,
            max_tokens: 1024,
            timeout: Duration::from_secs(5),
        });
        assert!(matches!(
            result,
            Err(ProviderError::MissingCredential {
                provider: ProviderKind::Anthropic
            })
        ));
    }
}
