//! Worker ordering, serialization, and backoff for `AnalysisQueue`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use stride_analysis::{AnalysisError, AnalysisQueue, JobRunner, QueueConfig};
use stride_core::enums::ProviderKind;
use stride_llm::ProviderError;
use tokio::time::Instant;

/// Fails each entry id a scripted number of times, then succeeds.
#[derive(Default)]
struct ScriptedRunner {
    failures: Mutex<HashMap<String, u32>>,
    always: Option<fn() -> AnalysisError>,
    latency: Duration,
    log: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedRunner {
    fn failing(id: &str, times: u32) -> Self {
        Self {
            failures: Mutex::new(HashMap::from([(id.to_string(), times)])),
            ..Self::default()
        }
    }

    fn always(error: fn() -> AnalysisError) -> Self {
        Self {
            always: Some(error),
            ..Self::default()
        }
    }

    fn order(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }

    fn instants(&self) -> Vec<Instant> {
        self.log.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

fn call_failure() -> AnalysisError {
    AnalysisError::ProviderCall {
        attempts: 3,
        source: ProviderError::Network("connection reset".into()),
    }
}

#[async_trait]
impl JobRunner for ScriptedRunner {
    async fn run(&self, entry_id: &str, _: Option<ProviderKind>) -> Result<(), AnalysisError> {
        self.log
            .lock()
            .unwrap()
            .push((entry_id.to_string(), Instant::now()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.always {
            return Err(error());
        }
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(entry_id) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Err(call_failure())
            }
            _ => Ok(()),
        }
    }
}

fn config(unit_ms: u64) -> QueueConfig {
    QueueConfig {
        max_attempts: 3,
        backoff_base: 2,
        backoff_unit: Duration::from_millis(unit_ms),
        job_pause: Duration::ZERO,
    }
}

async fn drain(queue: &AnalysisQueue) {
    tokio::time::timeout(Duration::from_secs(5), queue.wait_idle())
        .await
        .expect("queue did not drain");
}

#[tokio::test]
async fn failed_job_retries_after_later_jobs() {
    let runner = Arc::new(ScriptedRunner::failing("j1", 2));
    let queue = AnalysisQueue::new(runner.clone(), config(5));

    for id in ["j1", "j2", "j3"] {
        queue.enqueue(id, None).unwrap();
    }
    drain(&queue).await;

    assert_eq!(runner.order(), vec!["j1", "j2", "j3", "j1", "j1"]);
    let status = queue.status();
    assert_eq!((status.enqueued, status.succeeded, status.dropped), (3, 3, 0));
}

#[tokio::test]
async fn jobs_run_one_at_a_time() {
    let runner = Arc::new(ScriptedRunner {
        latency: Duration::from_millis(15),
        ..ScriptedRunner::default()
    });
    let queue = AnalysisQueue::new(runner.clone(), config(5));

    for id in ["a", "b", "c", "d"] {
        queue.enqueue(id, Some(ProviderKind::OpenAi)).unwrap();
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
    let status = queue.status();
    assert!(status.in_flight);
    assert_eq!(status.running.as_ref().map(|j| j.entry_id.as_str()), Some("a"));
    assert_eq!(status.running.as_ref().map(|j| j.attempts), Some(1));
    assert_eq!(status.depth, 3);

    drain(&queue).await;
    assert_eq!(runner.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(runner.order(), vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn always_failing_job_is_attempted_max_times_with_growing_delays() {
    let runner = Arc::new(ScriptedRunner::always(call_failure));
    let queue = AnalysisQueue::new(runner.clone(), config(20));

    queue.enqueue("doomed", None).unwrap();
    drain(&queue).await;

    let instants = runner.instants();
    assert_eq!(instants.len(), 3);
    let first_gap = instants[1] - instants[0];
    let second_gap = instants[2] - instants[1];
    assert!(first_gap >= Duration::from_millis(40), "{first_gap:?}");
    assert!(second_gap >= Duration::from_millis(80), "{second_gap:?}");
    assert!(second_gap >= first_gap);

    let status = queue.status();
    assert_eq!((status.succeeded, status.dropped), (0, 1));
}

#[tokio::test]
async fn non_retryable_failure_drops_immediately() {
    let runner = Arc::new(ScriptedRunner::always(|| AnalysisError::NotFound {
        entity: "entry",
        id: "gone".into(),
    }));
    let queue = AnalysisQueue::new(runner.clone(), config(5));

    queue.enqueue("gone", None).unwrap();
    drain(&queue).await;

    assert_eq!(runner.order(), vec!["gone"]);
    assert_eq!(queue.status().dropped, 1);
}

#[tokio::test]
async fn status_shows_backoff_and_clear_purges() {
    let runner = Arc::new(ScriptedRunner::failing("slow", 1));
    let queue = AnalysisQueue::new(runner.clone(), config(500));

    queue.enqueue("slow", None).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let status = queue.status();
    assert_eq!(status.depth, 1);
    assert!(!status.in_flight);
    let waiting = &status.jobs[0];
    assert_eq!(waiting.entry_id, "slow");
    assert_eq!(waiting.attempts, 1);
    assert!(waiting.ready_in_ms > 0);

    assert_eq!(queue.clear(), 1);
    drain(&queue).await;
    assert_eq!(runner.order(), vec!["slow"]);
    assert_eq!(queue.status().depth, 0);
}

#[tokio::test]
async fn enqueue_after_idle_restarts_worker() {
    let runner = Arc::new(ScriptedRunner::default());
    let queue = AnalysisQueue::new(runner.clone(), config(5));

    queue.enqueue("first", None).unwrap();
    drain(&queue).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    queue.enqueue("second", None).unwrap();
    drain(&queue).await;

    assert_eq!(runner.order(), vec!["first", "second"]);
    assert_eq!(queue.status().succeeded, 2);
}

/// Panics for one entry id, succeeds for every other.
#[derive(Default)]
struct PanickingRunner {
    log: Mutex<Vec<String>>,
}

#[async_trait]
impl JobRunner for PanickingRunner {
    async fn run(&self, entry_id: &str, _: Option<ProviderKind>) -> Result<(), AnalysisError> {
        self.log.lock().unwrap().push(entry_id.to_string());
        assert!(entry_id != "boom", "runner blew up on {entry_id}");
        Ok(())
    }
}

#[tokio::test]
async fn panicking_job_does_not_stall_the_queue() {
    let runner = Arc::new(PanickingRunner::default());
    let queue = AnalysisQueue::new(runner.clone(), config(5));

    queue.enqueue("boom", None).unwrap();
    queue.enqueue("after", None).unwrap();
    drain(&queue).await;

    assert_eq!(
        *runner.log.lock().unwrap(),
        vec!["boom", "after", "boom", "boom"]
    );
    let status = queue.status();
    assert!(!status.in_flight);
    assert_eq!(status.depth, 0);
    assert_eq!((status.succeeded, status.dropped), (1, 1));

    queue.enqueue("later", None).unwrap();
    drain(&queue).await;
    assert_eq!(queue.status().succeeded, 2);
}
