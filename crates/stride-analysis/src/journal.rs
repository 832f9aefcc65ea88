//! The `Journal` facade: entry ingestion, read paths, and reanalysis.

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use stride_config::StrideConfig;
use stride_core::entities::{DailyActivityRecord, Entry, Interpretation};
use stride_core::enums::ProviderKind;
use stride_core::responses::{BatchReport, EntryDetail, EntryWithLatest};
use stride_db::repos::daily_activity::DailyActivityFilter;
use stride_db::repos::entries::EntryFilter;
use stride_db::service::StrideService;
use stride_llm::{HttpProviderFactory, ProviderFactory};
use tokio::sync::watch;

use crate::error::AnalysisError;
use crate::executor::{Analyzer, CallRetry};
use crate::queue::{AnalysisQueue, JobRunner, QueueConfig, QueueStatus};
use crate::settings::{EnvLookup, ProviderResolver, SettingsSource, process_env};

pub struct Journal {
    store: Arc<StrideService>,
    analyzer: Arc<Analyzer>,
    queue: Arc<AnalysisQueue>,
    batch_concurrency: usize,
    default_limit: u32,
    /// Enqueue tasks spawned by `create_entry` that have not run yet.
    pending_enqueues: Arc<watch::Sender<usize>>,
}

impl fmt::Debug for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("queue", &self.queue)
            .field("batch_concurrency", &self.batch_concurrency)
            .finish_non_exhaustive()
    }
}

impl Journal {
    /// Wire the analyzer and queue around an open store.
    #[must_use]
    pub fn new(
        store: Arc<StrideService>,
        factory: Arc<dyn ProviderFactory>,
        config: &StrideConfig,
        env: EnvLookup,
    ) -> Self {
        let settings: Arc<dyn SettingsSource> = Arc::clone(&store) as Arc<dyn SettingsSource>;
        let resolver = ProviderResolver::new(settings, config.providers.clone(), env);
        let analyzer = Arc::new(Analyzer::new(
            Arc::clone(&store),
            resolver,
            factory,
            CallRetry::from_config(&config.analysis),
        ));
        let runner: Arc<dyn JobRunner> = Arc::clone(&analyzer) as Arc<dyn JobRunner>;
        let queue = AnalysisQueue::new(runner, QueueConfig::from_config(&config.analysis));
        let (pending_enqueues, _) = watch::channel(0);

        Self {
            store,
            analyzer,
            queue,
            batch_concurrency: config.analysis.batch_concurrency.max(1),
            default_limit: config.general.default_limit,
            pending_enqueues: Arc::new(pending_enqueues),
        }
    }

    /// Open the configured database and use the HTTP provider backends.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Database` if the store cannot be opened or migrated.
    pub async fn open(config: &StrideConfig) -> Result<Self, AnalysisError> {
        let path = config.database.resolved_path();
        let store = StrideService::new_local(&path.to_string_lossy()).await?;
        tracing::debug!(path = %path.display(), "journal store opened");
        let factory: Arc<dyn ProviderFactory> =
            Arc::new(HttpProviderFactory::new(config.providers.clone()));
        Ok(Self::new(Arc::new(store), factory, config, process_env()))
    }

    #[must_use]
    pub fn store(&self) -> &StrideService {
        &self.store
    }

    #[must_use]
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Store an entry and schedule its analysis.
    ///
    /// Returns as soon as the row is written. A repeated idempotency key
    /// returns the stored entry and schedules nothing. Enqueue failures are
    /// logged, never returned.
    ///
    /// # Errors
    ///
    /// `Validation` for blank text or an unusable key; `Database` when the
    /// row cannot be written.
    pub async fn create_entry(
        &self,
        text: &str,
        linked_goal_ids: &[String],
        idempotency_key: Option<&str>,
        provider: Option<ProviderKind>,
    ) -> Result<Entry, AnalysisError> {
        let (entry, created) = self
            .store
            .insert_entry(text, linked_goal_ids, idempotency_key, chrono::Utc::now())
            .await?;

        if created {
            self.pending_enqueues.send_modify(|n| *n += 1);
            let queue = Arc::clone(&self.queue);
            let pending = Arc::clone(&self.pending_enqueues);
            let entry_id = entry.id.clone();
            tokio::spawn(async move {
                if let Err(err) = queue.enqueue(&entry_id, provider) {
                    tracing::warn!(entry_id = %entry_id, error = %err, "failed to queue analysis");
                }
                pending.send_modify(|n| *n = n.saturating_sub(1));
            });
        }

        Ok(entry)
    }

    /// Newest entries first, each with its latest interpretation.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Database` on read failure.
    pub async fn list_entries(
        &self,
        filter: &EntryFilter,
    ) -> Result<Vec<EntryWithLatest>, AnalysisError> {
        let mut filter = filter.clone();
        filter.limit = Some(filter.limit.unwrap_or(self.default_limit));
        Ok(self.store.list_entries(&filter).await?)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn get_entry(&self, id: &str) -> Result<EntryDetail, AnalysisError> {
        Ok(self.store.get_entry_detail(id).await?)
    }

    /// Analyze one entry now, bypassing the queue.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Configuration`, `ProviderCall`, or `Database`.
    pub async fn reanalyze(
        &self,
        entry_id: &str,
        provider: Option<ProviderKind>,
    ) -> Result<Interpretation, AnalysisError> {
        self.analyzer.analyze_strict(entry_id, provider).await
    }

    /// Entries that have no interpretation yet, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Database` on read failure.
    pub async fn list_pending_analysis(&self, limit: u32) -> Result<Vec<Entry>, AnalysisError> {
        Ok(self.store.list_pending(limit).await?)
    }

    #[must_use]
    pub fn queue_status(&self) -> QueueStatus {
        self.queue.status()
    }

    pub fn clear_queue(&self) -> usize {
        self.queue.clear()
    }

    /// Reanalyze `ids` with bounded concurrency, outside the queue.
    ///
    /// Failures are logged and listed in the report; ids keep their input
    /// order in both lists.
    pub async fn reanalyze_batch(
        &self,
        ids: &[String],
        provider: Option<ProviderKind>,
    ) -> BatchReport {
        let analyzer = &self.analyzer;
        let mut outcomes: Vec<(usize, bool)> = stream::iter(ids.iter().enumerate())
            .map(|(index, id)| async move {
                match analyzer.analyze_strict(id, provider).await {
                    Ok(_) => (index, true),
                    Err(err) => {
                        tracing::warn!(entry_id = %id, error = %err, "batch reanalysis failed");
                        (index, false)
                    }
                }
            })
            .buffer_unordered(self.batch_concurrency)
            .collect()
            .await;
        outcomes.sort_unstable_by_key(|(index, _)| *index);

        let mut report = BatchReport {
            requested: ids.len(),
            ..BatchReport::default()
        };
        for (index, ok) in outcomes {
            let id = ids[index].clone();
            if ok {
                report.succeeded.push(id);
            } else {
                report.failed.push(id);
            }
        }
        tracing::info!(
            requested = report.requested,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "batch reanalysis finished"
        );
        report
    }

    /// Analyze up to `limit` pending entries through [`Journal::reanalyze_batch`].
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Database` if the pending list cannot be read.
    pub async fn backfill_pending(
        &self,
        limit: u32,
        provider: Option<ProviderKind>,
    ) -> Result<BatchReport, AnalysisError> {
        let ids: Vec<String> = self
            .store
            .list_pending(limit)
            .await?
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        Ok(self.reanalyze_batch(&ids, provider).await)
    }

    /// # Errors
    ///
    /// Returns `AnalysisError::Database` on read failure.
    pub async fn daily_activity(
        &self,
        filter: &DailyActivityFilter,
    ) -> Result<Vec<DailyActivityRecord>, AnalysisError> {
        Ok(self.store.list_daily_activity(filter).await?)
    }

    /// Resolves once every scheduled enqueue has landed and the queue has
    /// drained.
    pub async fn wait_idle(&self) {
        let mut rx = self.pending_enqueues.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
        self.queue.wait_idle().await;
    }

    /// Stop accepting queue work. Returns how many queued jobs were discarded.
    pub fn shutdown(&self) -> usize {
        self.queue.shutdown()
    }
}
