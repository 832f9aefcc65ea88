//! Backend selection: `ProviderKind` + resolved key -> `Box<dyn StructuredModel>`.

use std::time::Duration;

use stride_config::ProvidersConfig;
use stride_core::enums::ProviderKind;

use crate::error::ProviderError;
use crate::provider::{ModelSettings, StructuredModel};
use crate::{AnthropicModel, GeminiModel, OpenAiModel, anthropic, gemini, openai};

/// Creates a model client for a backend once its credential is known.
///
/// Credential resolution happens in the caller; the factory only applies
/// per-backend model, endpoint and call options.
pub trait ProviderFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns `ProviderError::MissingCredential` for an empty key.
    fn create(
        &self,
        kind: ProviderKind,
        api_key: &str,
    ) -> Result<Box<dyn StructuredModel>, ProviderError>;
}

/// Factory over the real HTTP backends, configured from `[providers]`.
#[derive(Debug, Clone)]
pub struct HttpProviderFactory {
    config: ProvidersConfig,
}

impl HttpProviderFactory {
    #[must_use]
    pub const fn new(config: ProvidersConfig) -> Self {
        Self { config }
    }

    /// Model, endpoint and call options for `kind`, with built-in defaults
    /// filling anything the config leaves blank.
    #[must_use]
    pub fn settings_for(&self, kind: ProviderKind, api_key: &str) -> ModelSettings {
        let backend = self.config.backend(kind);
        let (default_model, default_base) = match kind {
            ProviderKind::Anthropic => (anthropic::DEFAULT_MODEL, anthropic::DEFAULT_BASE_URL),
            ProviderKind::OpenAi => (openai::DEFAULT_MODEL, openai::DEFAULT_BASE_URL),
            ProviderKind::Gemini => (gemini::DEFAULT_MODEL, gemini::DEFAULT_BASE_URL),
        };
        ModelSettings {
            api_key: api_key.trim().to_string(),
            model: backend.model().unwrap_or(default_model).to_string(),
            base_url: backend
                .base_url()
                .unwrap_or(default_base)
                .trim_end_matches('/')
                .to_string(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            timeout: Duration::from_secs(self.config.timeout_secs),
        }
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn create(
        &self,
        kind: ProviderKind,
        api_key: &str,
    ) -> Result<Box<dyn StructuredModel>, ProviderError> {
        let settings = self.settings_for(kind, api_key);
        tracing::debug!(provider = %kind, model = %settings.model, "creating provider client");
        Ok(match kind {
            ProviderKind::Anthropic => Box::new(AnthropicModel::new(settings)?),
            ProviderKind::OpenAi => Box::new(OpenAiModel::new(settings)?),
            ProviderKind::Gemini => Box::new(GeminiModel::new(settings)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_config::BackendConfig;

    #[test]
    fn defaults_fill_blank_backend_settings() {
        let factory = HttpProviderFactory::new(ProvidersConfig::default());
        let settings = factory.settings_for(ProviderKind::Gemini, " g-key ");
        assert_eq!(settings.model, "gemini-2.5-flash");
        assert_eq!(settings.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(settings.api_key, "g-key");
        assert_eq!(settings.timeout, Duration::from_secs(60));
    }

    #[test]
    fn configured_model_and_url_win() {
        let config = ProvidersConfig {
            openai: BackendConfig {
                api_key: String::new(),
                model: "o3-mini".into(),
                base_url: "http://127.0.0.1:9000/".into(),
            },
            ..ProvidersConfig::default()
        };
        let factory = HttpProviderFactory::new(config);
        let settings = factory.settings_for(ProviderKind::OpenAi, "k");
        assert_eq!(settings.model, "o3-mini");
        assert_eq!(settings.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn each_kind_creates_matching_client() {
        let factory = HttpProviderFactory::new(ProvidersConfig::default());
        for kind in ProviderKind::ALL {
            let model = factory.create(kind, "key").unwrap();
            assert_eq!(model.provider(), kind);
        }
        assert!(matches!(
            factory.create(ProviderKind::OpenAi, ""),
            Err(ProviderError::MissingCredential { .. })
        ));
    }
}
