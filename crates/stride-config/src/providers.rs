//! LLM provider configuration: default backend, per-backend credentials and
//! models, and shared call options.

use serde::{Deserialize, Serialize};
use stride_core::enums::ProviderKind;

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_temperature() -> f32 {
    0.2
}

const fn default_max_tokens() -> u32 {
    2_048
}

/// Settings for one backend. Empty strings mean "use the built-in default".
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    /// API key (overridden by a key stored in user settings).
    #[serde(default)]
    pub api_key: String,

    /// Model identifier.
    #[serde(default)]
    pub model: String,

    /// Custom endpoint, e.g. a proxy or a local stub.
    #[serde(default)]
    pub base_url: String,
}

impl BackendConfig {
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        non_empty(&self.api_key)
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        non_empty(&self.model)
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        non_empty(&self.base_url)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// Backend used when neither the caller nor user settings choose one.
    #[serde(default)]
    pub default: Option<ProviderKind>,

    /// HTTP timeout for a single provider call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature, sent only to backends/models that accept it.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token ceiling for one analysis.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub anthropic: BackendConfig,

    #[serde(default)]
    pub openai: BackendConfig,

    #[serde(default)]
    pub gemini: BackendConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            default: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            anthropic: BackendConfig::default(),
            openai: BackendConfig::default(),
            gemini: BackendConfig::default(),
        }
    }
}

impl ProvidersConfig {
    /// Per-backend settings for `kind`.
    #[must_use]
    pub const fn backend(&self, kind: ProviderKind) -> &BackendConfig {
        match kind {
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Gemini => &self.gemini,
        }
    }
}
