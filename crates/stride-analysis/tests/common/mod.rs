//! Fake provider backends and a fast-configured journal for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use stride_analysis::{EnvLookup, Journal};
use stride_config::StrideConfig;
use stride_core::enums::ProviderKind;
use stride_db::service::StrideService;
use stride_llm::{ProviderError, ProviderFactory, StructuredModel};
use stride_schema::StructuredSchema;

/// Shared behaviour and counters for every model the fake factory hands out.
pub struct FakeBackend {
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    fail_first: AtomicUsize,
    invent_first: AtomicUsize,
    always_fail: AtomicBool,
    level: &'static str,
    latency: Duration,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Self::build(0, false, Duration::ZERO)
    }

    /// Fails the first `n` calls with a network error.
    pub fn flaky(n: usize) -> Arc<Self> {
        Self::build(n, false, Duration::ZERO)
    }

    /// Every call fails with a 503.
    pub fn broken() -> Arc<Self> {
        Self::build(0, true, Duration::ZERO)
    }

    pub fn slow(latency: Duration) -> Arc<Self> {
        Self::build(0, false, latency)
    }

    /// The first `n` answers carry an extra goal id the schema does not allow.
    pub fn inventing(n: usize) -> Arc<Self> {
        let backend = Self::build(0, false, Duration::ZERO);
        backend.invent_first.store(n, Ordering::SeqCst);
        backend
    }

    fn build(fail_first: usize, always_fail: bool, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            fail_first: AtomicUsize::new(fail_first),
            invent_first: AtomicUsize::new(0),
            always_fail: AtomicBool::new(always_fail),
            level: "full",
            latency,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, schema: &StructuredSchema) -> Result<Value, ProviderError> {
        if self.always_fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Http {
                status: 503,
                body: "overloaded".into(),
            });
        }
        if self
            .fail_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(ProviderError::Network("connection reset".into()));
        }

        let goal_ids = &schema.json["properties"]["goal_activity"]["properties"];
        let mut goal_activity: serde_json::Map<String, Value> = goal_ids
            .as_object()
            .map(|props| {
                props
                    .keys()
                    .map(|id| (id.clone(), json!(self.level)))
                    .collect()
            })
            .unwrap_or_default();
        if self
            .invent_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            goal_activity.insert("gol-invented".into(), json!("partial"));
        }

        Ok(json!({
            "goal_activity": goal_activity,
            "momentum": "medium",
            "risk_flags": ["short sleep"],
            "suggestion": "Keep the same slot tomorrow",
            "reframe": null
        }))
    }
}

pub struct FakeModel {
    kind: ProviderKind,
    backend: Arc<FakeBackend>,
}

#[async_trait]
impl StructuredModel for FakeModel {
    fn provider(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        "fake-model"
    }

    async fn generate_structured_object(
        &self,
        _system: &str,
        _user: &str,
        schema: &StructuredSchema,
    ) -> Result<Value, ProviderError> {
        let b = &self.backend;
        b.calls.fetch_add(1, Ordering::SeqCst);
        let now = b.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        b.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !b.latency.is_zero() {
            tokio::time::sleep(b.latency).await;
        }
        let result = b.respond(schema);
        b.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

pub struct FakeFactory {
    pub backend: Arc<FakeBackend>,
}

impl ProviderFactory for FakeFactory {
    fn create(
        &self,
        kind: ProviderKind,
        api_key: &str,
    ) -> Result<Box<dyn StructuredModel>, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential { provider: kind });
        }
        Ok(Box::new(FakeModel {
            kind,
            backend: Arc::clone(&self.backend),
        }))
    }
}

/// Config with millisecond-scale backoff so retry paths finish quickly.
pub fn fast_config() -> StrideConfig {
    let mut config = StrideConfig::default();
    config.analysis.queue_backoff_unit_ms = 5;
    config.analysis.job_pause_ms = 0;
    config.analysis.call_base_delay_ms = 1;
    config.analysis.call_max_delay_ms = 4;
    config
}

/// Every `*_API_KEY` variable resolves.
pub fn env_with_keys() -> EnvLookup {
    Arc::new(|name| name.ends_with("_API_KEY").then(|| format!("test-{name}")))
}

pub fn empty_env() -> EnvLookup {
    Arc::new(|_| None)
}

pub async fn journal_with(backend: &Arc<FakeBackend>, env: EnvLookup) -> Journal {
    let store = StrideService::new_local(":memory:").await.unwrap();
    let factory = Arc::new(FakeFactory {
        backend: Arc::clone(backend),
    });
    Journal::new(Arc::new(store), factory, &fast_config(), env)
}

pub async fn journal(backend: &Arc<FakeBackend>) -> Journal {
    journal_with(backend, env_with_keys()).await
}
