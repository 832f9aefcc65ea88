//! In-process analysis queue.
//!
//! One worker task drains a FIFO list strictly one job at a time. A failed
//! job goes back to the tail with a ready-at instant of
//! `now + base^attempt × unit`; the worker always takes the first job whose
//! ready-at has passed and otherwise sleeps until the earliest ready-at or
//! the next enqueue. Jobs live only in memory: a restart loses them, and the
//! pending-analysis read path is how they are recovered.
//!
//! ```text
//! Queued -> Running -> Succeeded
//!                   -> Queued (retryable failure, attempts left)
//!                   -> Dropped (non-retryable, or out of attempts)
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use stride_config::AnalysisConfig;
use stride_core::enums::ProviderKind;
use tokio::sync::{Notify, watch};
use tokio::time::Instant;

use crate::error::AnalysisError;

/// Work performed for each dequeued job.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, entry_id: &str, provider: Option<ProviderKind>) -> Result<(), AnalysisError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    pub max_attempts: u32,
    pub backoff_base: u32,
    pub backoff_unit: Duration,
    pub job_pause: Duration,
}

impl QueueConfig {
    #[must_use]
    pub const fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_attempts: config.queue_max_attempts,
            backoff_base: config.queue_backoff_base,
            backoff_unit: config.queue_backoff_unit(),
            job_pause: config.job_pause(),
        }
    }

    /// Wait before retrying a job that has failed `attempt` times.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(self.backoff_base.saturating_pow(attempt))
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

#[derive(Debug, Clone)]
struct Job {
    entry_id: String,
    provider: Option<ProviderKind>,
    /// Attempts started, including the one in progress.
    attempts: u32,
    ready_at: Instant,
}

impl Job {
    fn snapshot(&self, max_attempts: u32, now: Instant) -> JobSnapshot {
        JobSnapshot {
            entry_id: self.entry_id.clone(),
            provider: self.provider,
            attempts: self.attempts,
            max_attempts,
            ready_in_ms: u64::try_from(self.ready_at.saturating_duration_since(now).as_millis())
                .unwrap_or(u64::MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSnapshot {
    pub entry_id: String,
    pub provider: Option<ProviderKind>,
    pub attempts: u32,
    pub max_attempts: u32,
    /// Zero once the job may run.
    pub ready_in_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub depth: usize,
    pub in_flight: bool,
    pub running: Option<JobSnapshot>,
    pub jobs: Vec<JobSnapshot>,
    pub enqueued: u64,
    pub succeeded: u64,
    pub dropped: u64,
    pub shut_down: bool,
}

#[derive(Debug, Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    running: Option<Job>,
    worker_active: bool,
    shut_down: bool,
    enqueued: u64,
    succeeded: u64,
    dropped: u64,
}

impl QueueState {
    fn is_idle(&self) -> bool {
        self.jobs.is_empty() && self.running.is_none()
    }
}

enum Next {
    Run(Job),
    WaitUntil(Instant),
    Exit,
}

pub struct AnalysisQueue {
    state: Mutex<QueueState>,
    runner: Arc<dyn JobRunner>,
    config: QueueConfig,
    wake: Notify,
    idle: watch::Sender<bool>,
}

impl fmt::Debug for AnalysisQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisQueue")
            .field("config", &self.config)
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl AnalysisQueue {
    #[must_use]
    pub fn new(runner: Arc<dyn JobRunner>, config: QueueConfig) -> Arc<Self> {
        let (idle, _) = watch::channel(true);
        Arc::new(Self {
            state: Mutex::new(QueueState::default()),
            runner,
            config,
            wake: Notify::new(),
            idle,
        })
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_idle(&self, state: &QueueState) {
        let idle = state.is_idle();
        self.idle.send_if_modified(|current| {
            let changed = *current != idle;
            *current = idle;
            changed
        });
    }

    /// Append a job and make sure a worker is draining the queue.
    ///
    /// Must be called inside a tokio runtime. Never waits on the job.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::QueueClosed` after [`AnalysisQueue::shutdown`].
    pub fn enqueue(
        self: &Arc<Self>,
        entry_id: &str,
        provider: Option<ProviderKind>,
    ) -> Result<(), AnalysisError> {
        let spawn_worker = {
            let mut state = self.lock();
            if state.shut_down {
                return Err(AnalysisError::QueueClosed);
            }
            state.jobs.push_back(Job {
                entry_id: entry_id.to_string(),
                provider,
                attempts: 0,
                ready_at: Instant::now(),
            });
            state.enqueued += 1;
            self.publish_idle(&state);
            tracing::debug!(entry_id, depth = state.jobs.len(), "analysis job queued");
            !std::mem::replace(&mut state.worker_active, true)
        };

        if spawn_worker {
            let queue = Arc::clone(self);
            tokio::spawn(async move { queue.run_worker().await });
        } else {
            self.wake.notify_one();
        }
        Ok(())
    }

    fn next_job(&self) -> Next {
        let mut state = self.lock();
        let now = Instant::now();
        if let Some(index) = state.jobs.iter().position(|job| job.ready_at <= now) {
            if let Some(mut job) = state.jobs.remove(index) {
                job.attempts += 1;
                state.running = Some(job.clone());
                return Next::Run(job);
            }
        }
        match state.jobs.iter().map(|job| job.ready_at).min() {
            Some(at) => Next::WaitUntil(at),
            None => {
                state.worker_active = false;
                self.publish_idle(&state);
                Next::Exit
            }
        }
    }

    async fn run_worker(self: Arc<Self>) {
        tracing::info!("analysis worker started");
        loop {
            match self.next_job() {
                Next::Exit => break,
                Next::WaitUntil(at) => {
                    tokio::select! {
                        () = tokio::time::sleep_until(at) => {}
                        () = self.wake.notified() => {}
                    }
                }
                Next::Run(job) => {
                    self.run_job(job).await;
                    tokio::time::sleep(self.config.job_pause).await;
                }
            }
        }
        tracing::info!("analysis worker stopped");
    }

    /// Runs one attempt in its own task. A panic there surfaces as `JobAborted`.
    async fn run_job(&self, mut job: Job) {
        tracing::info!(
            entry_id = %job.entry_id,
            attempt = job.attempts,
            provider = ?job.provider,
            "analysis job started"
        );
        let runner = Arc::clone(&self.runner);
        let entry_id = job.entry_id.clone();
        let provider = job.provider;
        let handle = tokio::spawn(async move { runner.run(&entry_id, provider).await });
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => Err(AnalysisError::JobAborted {
                entry_id: job.entry_id.clone(),
                reason: if err.is_panic() {
                    "runner panicked".to_string()
                } else {
                    err.to_string()
                },
            }),
        };

        let mut state = self.lock();
        state.running = None;
        match result {
            Ok(()) => {
                state.succeeded += 1;
                tracing::info!(entry_id = %job.entry_id, attempt = job.attempts, "analysis job finished");
            }
            Err(err) if err.is_retryable() && job.attempts < self.config.max_attempts => {
                let delay = self.config.backoff(job.attempts);
                tracing::warn!(
                    entry_id = %job.entry_id,
                    attempt = job.attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "analysis job failed, requeued"
                );
                job.ready_at = Instant::now() + delay;
                state.jobs.push_back(job);
            }
            Err(err) => {
                state.dropped += 1;
                if err.is_retryable() {
                    let exhausted = AnalysisError::QueueExhausted {
                        entry_id: job.entry_id.clone(),
                        attempts: job.attempts,
                    };
                    tracing::error!(
                        entry_id = %job.entry_id,
                        attempt = job.attempts,
                        error = %err,
                        "{exhausted}"
                    );
                } else {
                    tracing::error!(
                        entry_id = %job.entry_id,
                        attempt = job.attempts,
                        error = %err,
                        "analysis job dropped"
                    );
                }
            }
        }
        self.publish_idle(&state);
    }

    #[must_use]
    pub fn status(&self) -> QueueStatus {
        let state = self.lock();
        let now = Instant::now();
        let max = self.config.max_attempts;
        QueueStatus {
            depth: state.jobs.len(),
            in_flight: state.running.is_some(),
            running: state.running.as_ref().map(|job| job.snapshot(max, now)),
            jobs: state.jobs.iter().map(|job| job.snapshot(max, now)).collect(),
            enqueued: state.enqueued,
            succeeded: state.succeeded,
            dropped: state.dropped,
            shut_down: state.shut_down,
        }
    }

    /// Remove every queued job. A running job is left to finish.
    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        let removed = state.jobs.len();
        state.jobs.clear();
        self.publish_idle(&state);
        drop(state);
        self.wake.notify_one();
        if removed > 0 {
            tracing::info!(removed, "analysis queue cleared");
        }
        removed
    }

    /// Resolves once nothing is queued or running.
    pub async fn wait_idle(&self) {
        let mut rx = self.idle.subscribe();
        let _ = rx.wait_for(|idle| *idle).await;
    }

    /// Refuse further enqueues and discard queued jobs. Returns how many
    /// were discarded.
    pub fn shutdown(&self) -> usize {
        self.lock().shut_down = true;
        self.clear()
    }
}
