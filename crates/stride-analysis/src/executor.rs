//! Single-entry analysis: load context, call the provider, persist, aggregate.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stride_config::AnalysisConfig;
use stride_core::entities::{Interpretation, utc_day};
use stride_core::enums::ProviderKind;
use stride_db::repos::interpretations::InterpretationDraft;
use stride_db::service::StrideService;
use stride_llm::{ProviderError, ProviderFactory, StructuredModel};
use stride_schema::{AnalysisOutput, StructuredSchema, analysis_schema};

use crate::error::AnalysisError;
use crate::prompts;
use crate::queue::JobRunner;
use crate::settings::ProviderResolver;

/// Retry policy for one provider call, independent of job-level retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRetry {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl CallRetry {
    #[must_use]
    pub const fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_attempts: config.call_max_attempts,
            base_delay: config.call_base_delay(),
            max_delay: config.call_max_delay(),
        }
    }

    /// Delay after failed attempt `attempt` (1-based): `base × 2^(attempt-1)`, capped.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for CallRetry {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Return `ProviderCall` errors instead of logging them and yielding `None`.
    pub throw_on_error: bool,
}

pub struct Analyzer {
    store: Arc<StrideService>,
    resolver: ProviderResolver,
    factory: Arc<dyn ProviderFactory>,
    retry: CallRetry,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("resolver", &self.resolver)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    #[must_use]
    pub fn new(
        store: Arc<StrideService>,
        resolver: ProviderResolver,
        factory: Arc<dyn ProviderFactory>,
        retry: CallRetry,
    ) -> Self {
        Self {
            store,
            resolver,
            factory,
            retry,
        }
    }

    /// Analyze one entry and persist the result.
    ///
    /// With `throw_on_error` unset, a provider failure that survives the
    /// call retries is logged and yields `Ok(None)`; the entry then stays in
    /// the pending list.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown entry, `Configuration` when no credential
    /// resolves, `ProviderCall` (only with `throw_on_error`), `Database`.
    pub async fn analyze(
        &self,
        entry_id: &str,
        provider: Option<ProviderKind>,
        options: AnalyzeOptions,
    ) -> Result<Option<Interpretation>, AnalysisError> {
        match self.analyze_strict(entry_id, provider).await {
            Ok(interpretation) => Ok(Some(interpretation)),
            Err(err @ AnalysisError::ProviderCall { .. }) if !options.throw_on_error => {
                tracing::warn!(entry_id, error = %err, "analysis failed, entry left pending");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// [`Analyzer::analyze`] with `throw_on_error` set.
    ///
    /// # Errors
    ///
    /// See [`Analyzer::analyze`].
    pub async fn analyze_strict(
        &self,
        entry_id: &str,
        provider: Option<ProviderKind>,
    ) -> Result<Interpretation, AnalysisError> {
        let entry = self.store.get_entry(entry_id).await?;
        let day = utc_day(entry.created_at);
        let goals = self.store.active_goals(day).await?;

        if goals.is_empty() {
            tracing::info!(entry_id, "no active goals, recording neutral interpretation");
            let neutral = InterpretationDraft::neutral(entry.id.as_str());
            return Ok(self.store.insert_interpretation(neutral).await?);
        }

        let kind = self.resolver.resolve_provider(provider).await?;
        let api_key = self.resolver.resolve_credential(kind).await?;
        let model = self
            .factory
            .create(kind, &api_key)
            .map_err(|e| AnalysisError::Configuration(e.to_string()))?;

        let goal_ids: Vec<&str> = goals.iter().map(|a| a.goal.id.as_str()).collect();
        let schema = analysis_schema(&goal_ids);
        let system = prompts::system_prompt();
        let user = prompts::user_prompt(&entry, day, &goals);

        let output = self
            .call_with_retry(model.as_ref(), entry_id, &system, &user, &schema)
            .await?;

        let interpretation = self
            .store
            .insert_interpretation(InterpretationDraft {
                entry_id: entry.id.clone(),
                provider: Some(kind),
                model: Some(model.model().to_string()),
                goal_activity: output.goal_activity,
                momentum: output.momentum,
                risk_flags: output.risk_flags,
                suggestion: output.suggestion,
                reframe: output.reframe,
            })
            .await?;

        let report = self
            .store
            .merge_day(
                entry.created_at,
                &interpretation.goal_activity,
                Some(interpretation.id.as_str()),
            )
            .await;
        tracing::info!(
            entry_id,
            interpretation_id = %interpretation.id,
            provider = %kind,
            momentum = %interpretation.momentum,
            days_changed = report.changed(),
            merge_failures = report.failed.len(),
            "entry analyzed"
        );

        Ok(interpretation)
    }

    async fn call_with_retry(
        &self,
        model: &dyn StructuredModel,
        entry_id: &str,
        system: &str,
        user: &str,
        schema: &StructuredSchema,
    ) -> Result<AnalysisOutput, AnalysisError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = model
                .generate_structured_object(system, user, schema)
                .await
                .and_then(|value| {
                    AnalysisOutput::from_validated(schema, value).map_err(ProviderError::from)
                });

            match result {
                Ok(output) => return Ok(output),
                Err(err) if attempt < self.retry.max_attempts && err.is_transient() => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        entry_id,
                        attempt,
                        provider = %model.provider(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "provider call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(source) => {
                    return Err(AnalysisError::ProviderCall {
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }
}

#[async_trait]
impl JobRunner for Analyzer {
    async fn run(&self, entry_id: &str, provider: Option<ProviderKind>) -> Result<(), AnalysisError> {
        self.analyze_strict(entry_id, provider).await.map(|_| ())
    }
}
