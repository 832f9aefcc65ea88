//! Provider and credential resolution.
//!
//! Provider: explicit argument, then the user's stored default, then the
//! config default, then [`ProviderKind::FALLBACK`]. Credential: stored key,
//! then `[providers.<p>].api_key`, then the backend's conventional
//! environment variable.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use stride_config::ProvidersConfig;
use stride_core::enums::ProviderKind;
use stride_db::service::StrideService;

use crate::error::AnalysisError;

/// Per-user provider preferences.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn default_provider(&self) -> Result<Option<ProviderKind>, AnalysisError>;

    async fn stored_credential(
        &self,
        provider: ProviderKind,
    ) -> Result<Option<String>, AnalysisError>;
}

#[async_trait]
impl SettingsSource for StrideService {
    async fn default_provider(&self) -> Result<Option<ProviderKind>, AnalysisError> {
        Ok(Self::default_provider(self).await?)
    }

    async fn stored_credential(
        &self,
        provider: ProviderKind,
    ) -> Result<Option<String>, AnalysisError> {
        Ok(Self::stored_credential(self, provider).await?)
    }
}

/// Environment lookup, swappable so tests stay independent of the process env.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

#[must_use]
pub fn process_env() -> EnvLookup {
    Arc::new(|name| std::env::var(name).ok())
}

#[derive(Clone)]
pub struct ProviderResolver {
    settings: Arc<dyn SettingsSource>,
    config: ProvidersConfig,
    env: EnvLookup,
}

impl fmt::Debug for ProviderResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderResolver")
            .field("default", &self.config.default)
            .finish_non_exhaustive()
    }
}

impl ProviderResolver {
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsSource>, config: ProvidersConfig, env: EnvLookup) -> Self {
        Self {
            settings,
            config,
            env,
        }
    }

    /// # Errors
    ///
    /// Propagates settings read failures.
    pub async fn resolve_provider(
        &self,
        explicit: Option<ProviderKind>,
    ) -> Result<ProviderKind, AnalysisError> {
        if let Some(kind) = explicit {
            return Ok(kind);
        }
        if let Some(kind) = self.settings.default_provider().await? {
            return Ok(kind);
        }
        Ok(self.config.default.unwrap_or(ProviderKind::FALLBACK))
    }

    /// # Errors
    ///
    /// Returns `AnalysisError::Configuration` when no source yields a key.
    pub async fn resolve_credential(&self, kind: ProviderKind) -> Result<String, AnalysisError> {
        if let Some(key) = self.settings.stored_credential(kind).await? {
            tracing::debug!(provider = %kind, "using stored credential");
            return Ok(key);
        }
        if let Some(key) = self.config.backend(kind).api_key() {
            tracing::debug!(provider = %kind, "using configured credential");
            return Ok(key.to_string());
        }
        let var = kind.api_key_env();
        match (self.env)(var).filter(|v| !v.trim().is_empty()) {
            Some(key) => Ok(key.trim().to_string()),
            None => Err(AnalysisError::Configuration(format!(
                "no API key for {kind}: store one, set providers.{kind}.api_key, or export {var}"
            ))),
        }
    }
}
