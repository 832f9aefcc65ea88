//! Tuning for the analysis queue, the per-call retry loop, and batch fan-out.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_queue_max_attempts() -> u32 {
    3
}

const fn default_queue_backoff_base() -> u32 {
    2
}

const fn default_queue_backoff_unit_ms() -> u64 {
    1_000
}

const fn default_job_pause_ms() -> u64 {
    500
}

const fn default_call_max_attempts() -> u32 {
    3
}

const fn default_call_base_delay_ms() -> u64 {
    500
}

const fn default_call_max_delay_ms() -> u64 {
    8_000
}

const fn default_batch_concurrency() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Job-level attempts before a queued job is dropped.
    #[serde(default = "default_queue_max_attempts")]
    pub queue_max_attempts: u32,

    /// Base of the job-level backoff: a failed job waits `base^attempt` units.
    #[serde(default = "default_queue_backoff_base")]
    pub queue_backoff_base: u32,

    /// Length of one backoff unit, in milliseconds.
    #[serde(default = "default_queue_backoff_unit_ms")]
    pub queue_backoff_unit_ms: u64,

    /// Pause after every job, successful or not, in milliseconds.
    #[serde(default = "default_job_pause_ms")]
    pub job_pause_ms: u64,

    /// Provider-call attempts inside a single analysis run.
    #[serde(default = "default_call_max_attempts")]
    pub call_max_attempts: u32,

    /// Initial delay between provider-call attempts, in milliseconds.
    #[serde(default = "default_call_base_delay_ms")]
    pub call_base_delay_ms: u64,

    /// Cap on the provider-call retry delay, in milliseconds.
    #[serde(default = "default_call_max_delay_ms")]
    pub call_max_delay_ms: u64,

    /// Concurrent analyses for explicit batch or backfill reanalysis.
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            queue_max_attempts: default_queue_max_attempts(),
            queue_backoff_base: default_queue_backoff_base(),
            queue_backoff_unit_ms: default_queue_backoff_unit_ms(),
            job_pause_ms: default_job_pause_ms(),
            call_max_attempts: default_call_max_attempts(),
            call_base_delay_ms: default_call_base_delay_ms(),
            call_max_delay_ms: default_call_max_delay_ms(),
            batch_concurrency: default_batch_concurrency(),
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub const fn queue_backoff_unit(&self) -> Duration {
        Duration::from_millis(self.queue_backoff_unit_ms)
    }

    #[must_use]
    pub const fn job_pause(&self) -> Duration {
        Duration::from_millis(self.job_pause_ms)
    }

    #[must_use]
    pub const fn call_base_delay(&self) -> Duration {
        Duration::from_millis(self.call_base_delay_ms)
    }

    #[must_use]
    pub const fn call_max_delay(&self) -> Duration {
        Duration::from_millis(self.call_max_delay_ms)
    }

    /// Reject values that would stall the queue or disable analysis outright.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("analysis.queue_max_attempts", self.queue_max_attempts == 0),
            ("analysis.queue_backoff_base", self.queue_backoff_base == 0),
            ("analysis.call_max_attempts", self.call_max_attempts == 0),
            ("analysis.batch_concurrency", self.batch_concurrency == 0),
        ];
        for (field, invalid) in checks {
            if invalid {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if self.call_max_delay_ms < self.call_base_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "analysis.call_max_delay_ms".to_string(),
                reason: "must not be smaller than call_base_delay_ms".to_string(),
            });
        }
        Ok(())
    }
}
