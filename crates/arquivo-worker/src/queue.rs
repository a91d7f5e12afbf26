//! Extraction queue: in-memory job list, single worker loop, retention sweep.
//!
//! Enqueue is the only idle-to-active transition: the first enqueue spawns the
//! worker loop, which drains pending jobs FIFO and exits when none remain.
//! At most one job is ever processing. Failed jobs are not retried; a caller
//! must enqueue a new job (reprocess) to try again. Nothing here survives a
//! process restart.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use arquivo_core::models::{ExtractionJob, JobStatus, QueueSummary};
use arquivo_extract::{Pass, TextExtractor};
use arquivo_storage::Storage;

use crate::context::DocumentTextSink;

#[derive(Clone)]
pub struct ExtractionQueueConfig {
    /// Retention in seconds for finished jobs (completed/failed) before the
    /// sweep removes them.
    pub retention_secs: u64,
    /// Interval in seconds between sweep runs. 0 = disabled.
    pub sweep_interval_secs: u64,
}

impl Default for ExtractionQueueConfig {
    fn default() -> Self {
        Self {
            retention_secs: 3600,
            sweep_interval_secs: 300,
        }
    }
}

struct QueueState {
    jobs: Vec<ExtractionJob>,
    worker_active: bool,
}

struct QueueInner {
    state: Mutex<QueueState>,
    sink: Arc<dyn DocumentTextSink>,
    storage: Arc<dyn Storage>,
    extractor: TextExtractor,
    config: ExtractionQueueConfig,
}

/// The background extraction queue. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct ExtractionQueue {
    inner: Arc<QueueInner>,
}

impl ExtractionQueue {
    /// Create the queue and start the periodic finished-job sweep.
    ///
    /// The sweep task holds only a weak reference, so dropping the last queue
    /// handle stops it.
    pub fn new(
        sink: Arc<dyn DocumentTextSink>,
        storage: Arc<dyn Storage>,
        extractor: TextExtractor,
        config: ExtractionQueueConfig,
    ) -> Self {
        let inner = Arc::new(QueueInner {
            state: Mutex::new(QueueState {
                jobs: Vec::new(),
                worker_active: false,
            }),
            sink,
            storage,
            extractor,
            config: config.clone(),
        });

        if config.sweep_interval_secs > 0 {
            let weak: Weak<QueueInner> = Arc::downgrade(&inner);
            let sweep_interval = Duration::from_secs(config.sweep_interval_secs);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(sweep_interval);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    interval.tick().await;
                    let Some(inner) = weak.upgrade() else { break };
                    QueueInner::sweep_finished(&inner).await;
                }
            });
        }

        Self { inner }
    }

    /// Submit an advanced extraction job. Returns the job id.
    ///
    /// If no worker loop is running, this enqueue starts one; otherwise the
    /// job waits in pending state until the running loop reaches it.
    pub async fn enqueue(
        &self,
        document_id: Uuid,
        storage_key: &str,
        content_type: &str,
    ) -> String {
        let job = ExtractionJob::new(
            document_id,
            storage_key.to_string(),
            content_type.to_string(),
        );
        let job_id = job.id.clone();

        let start_worker = {
            let mut state = self.inner.state.lock().await;
            state.jobs.push(job);
            if state.worker_active {
                false
            } else {
                state.worker_active = true;
                true
            }
        };

        tracing::info!(
            job_id = %job_id,
            document_id = %document_id,
            content_type = %content_type,
            starts_worker = start_worker,
            "Extraction job enqueued"
        );

        if start_worker {
            let inner = self.inner.clone();
            tokio::spawn(async move {
                QueueInner::run_worker(inner).await;
            });
        }

        job_id
    }

    /// Look up a job record by id. Finished jobs disappear once the retention
    /// sweep has removed them.
    pub async fn job(&self, job_id: &str) -> Option<ExtractionJob> {
        let state = self.inner.state.lock().await;
        state.jobs.iter().find(|j| j.id == job_id).cloned()
    }

    /// Counts by status over the currently retained job records.
    pub async fn summary(&self) -> QueueSummary {
        let state = self.inner.state.lock().await;
        let mut summary = QueueSummary {
            total: state.jobs.len(),
            ..Default::default()
        };
        for job in &state.jobs {
            match job.status {
                JobStatus::Pending => summary.pending += 1,
                JobStatus::Processing => summary.processing += 1,
                JobStatus::Completed => summary.completed += 1,
                JobStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    #[cfg(test)]
    async fn sweep_now(&self) {
        QueueInner::sweep_finished(&self.inner).await;
    }

    #[cfg(test)]
    async fn with_state<R>(&self, f: impl FnOnce(&mut QueueState) -> R) -> R {
        let mut state = self.inner.state.lock().await;
        f(&mut state)
    }
}

impl QueueInner {
    /// The single worker loop. Claims the oldest pending job, runs the
    /// advanced pass, records the outcome, and repeats until no pending job
    /// remains; then clears the active flag and exits so a future enqueue can
    /// restart it. Extraction errors are recorded per job and never abort the
    /// loop.
    async fn run_worker(inner: Arc<QueueInner>) {
        tracing::debug!("Extraction worker started");

        loop {
            let claimed = {
                let mut state = inner.state.lock().await;
                match state
                    .jobs
                    .iter_mut()
                    .find(|j| j.status == JobStatus::Pending)
                {
                    Some(job) => {
                        job.status = JobStatus::Processing;
                        Some((
                            job.id.clone(),
                            job.document_id,
                            job.storage_key.clone(),
                            job.content_type.clone(),
                        ))
                    }
                    None => {
                        state.worker_active = false;
                        None
                    }
                }
            };

            let Some((job_id, document_id, storage_key, content_type)) = claimed else {
                break;
            };

            let result = Self::process(&inner, document_id, &storage_key, &content_type).await;

            let mut state = inner.state.lock().await;
            if let Some(job) = state.jobs.iter_mut().find(|j| j.id == job_id) {
                job.completed_at = Some(Utc::now());
                match result {
                    Ok(()) => {
                        job.status = JobStatus::Completed;
                        tracing::info!(job_id = %job.id, document_id = %document_id, "Extraction job completed");
                    }
                    Err(e) => {
                        job.status = JobStatus::Failed;
                        job.error = Some(e.to_string());
                        tracing::warn!(job_id = %job.id, document_id = %document_id, error = %e, "Extraction job failed");
                    }
                }
            }
        }

        tracing::debug!("No pending extraction jobs, worker exiting");
    }

    /// Run the advanced pass for one job and write the result back. On any
    /// error the document is left untouched.
    async fn process(
        inner: &Arc<QueueInner>,
        document_id: Uuid,
        storage_key: &str,
        content_type: &str,
    ) -> anyhow::Result<()> {
        let path = inner.storage.local_path(storage_key)?;

        let extractor = inner.extractor.clone();
        let content_type_owned = content_type.to_string();
        let text =
            tokio::task::spawn_blocking(move || {
                extractor.extract(&path, &content_type_owned, Pass::Advanced)
            })
            .await
            .map_err(|e| anyhow::anyhow!("Extraction task panicked: {}", e))??;

        inner.sink.apply_extracted_text(document_id, &text).await?;

        Ok(())
    }

    /// Remove completed/failed jobs older than the retention window.
    /// Pending and processing jobs are never swept.
    async fn sweep_finished(inner: &Arc<QueueInner>) {
        let cutoff = Utc::now() - chrono::Duration::seconds(inner.config.retention_secs as i64);

        let mut state = inner.state.lock().await;
        let before = state.jobs.len();
        state
            .jobs
            .retain(|j| !(j.status.is_finished() && j.completed_at.is_some_and(|t| t < cutoff)));
        let removed = before - state.jobs.len();

        if removed > 0 {
            tracing::debug!(removed, retained = state.jobs.len(), "Swept finished extraction jobs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arquivo_extract::pdf::PDF_PLACEHOLDER;
    use arquivo_storage::LocalStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Records write-backs; optionally fails or blocks until released.
    struct StubSink {
        applied: Mutex<Vec<(Uuid, String)>>,
        fail: bool,
        gate: Option<Arc<Notify>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl StubSink {
        fn new() -> Self {
            Self {
                applied: Mutex::new(Vec::new()),
                fail: false,
                gate: None,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl DocumentTextSink for StubSink {
        async fn apply_extracted_text(&self, document_id: Uuid, text: &str) -> anyhow::Result<()> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            if let Some(ref gate) = self.gate {
                gate.notified().await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail {
                anyhow::bail!("simulated store failure");
            }
            self.applied.lock().await.push((document_id, text.to_string()));
            Ok(())
        }
    }

    async fn test_queue(sink: Arc<dyn DocumentTextSink>) -> (ExtractionQueue, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let queue = ExtractionQueue::new(
            sink,
            storage,
            TextExtractor::new("spa+eng", 2500),
            ExtractionQueueConfig {
                retention_secs: 3600,
                sweep_interval_secs: 0,
            },
        );
        (queue, dir)
    }

    async fn wait_until_drained(queue: &ExtractionQueue) -> QueueSummary {
        for _ in 0..200 {
            let summary = queue.summary().await;
            if summary.pending == 0 && summary.processing == 0 {
                return summary;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("queue did not drain in time");
    }

    async fn upload_pdf(queue: &ExtractionQueue, key: &str) {
        queue
            .inner
            .storage
            .upload(key, b"%PDF-1.5 fake".to_vec())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_enqueue_n_jobs_all_reachable_and_completed() {
        let sink = Arc::new(StubSink::new());
        let (queue, _dir) = test_queue(sink.clone()).await;

        let mut job_ids = Vec::new();
        for i in 0..5 {
            let key = format!("documents/{}.pdf", i);
            upload_pdf(&queue, &key).await;
            job_ids.push(queue.enqueue(Uuid::new_v4(), &key, "application/pdf").await);
        }

        let summary = wait_until_drained(&queue).await;
        assert_eq!(summary.total, 5);
        assert_eq!(summary.completed, 5);
        assert_eq!(summary.failed, 0);

        // Every job id stays reachable until the sweep removes it
        for id in &job_ids {
            let job = queue.job(id).await.expect("job record retained");
            assert_eq!(job.status, JobStatus::Completed);
            assert!(job.completed_at.is_some());
            assert!(job.error.is_none());
        }

        assert_eq!(sink.applied.lock().await.len(), 5);
    }

    #[tokio::test]
    async fn test_completed_job_applies_text_through_sink() {
        let sink = Arc::new(StubSink::new());
        let (queue, _dir) = test_queue(sink.clone()).await;

        let document_id = Uuid::new_v4();
        upload_pdf(&queue, "documents/a.pdf").await;
        queue
            .enqueue(document_id, "documents/a.pdf", "application/pdf")
            .await;

        wait_until_drained(&queue).await;

        let applied = sink.applied.lock().await;
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].0, document_id);
        assert_eq!(applied[0].1, PDF_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_failed_extraction_records_error_and_skips_sink() {
        let sink = Arc::new(StubSink::new());
        let (queue, _dir) = test_queue(sink.clone()).await;

        // Image job whose file does not exist on disk: extraction errors
        // before any OCR work, the job fails, the document is untouched.
        let job_id = queue
            .enqueue(Uuid::new_v4(), "documents/missing.jpg", "image/jpeg")
            .await;

        let summary = wait_until_drained(&queue).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.completed, 0);

        let job = queue.job(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.is_some());
        assert!(sink.applied.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_fails_job() {
        let sink = Arc::new(StubSink::failing());
        let (queue, _dir) = test_queue(sink).await;

        upload_pdf(&queue, "documents/b.pdf").await;
        let job_id = queue
            .enqueue(Uuid::new_v4(), "documents/b.pdf", "application/pdf")
            .await;

        wait_until_drained(&queue).await;

        let job = queue.job(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.as_deref().unwrap().contains("simulated store failure"));
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_loop() {
        let sink = Arc::new(StubSink::new());
        let (queue, _dir) = test_queue(sink.clone()).await;

        // First job fails (missing file), second succeeds.
        queue
            .enqueue(Uuid::new_v4(), "documents/missing.jpg", "image/jpeg")
            .await;
        upload_pdf(&queue, "documents/ok.pdf").await;
        queue
            .enqueue(Uuid::new_v4(), "documents/ok.pdf", "application/pdf")
            .await;

        let summary = wait_until_drained(&queue).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(sink.applied.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_at_most_one_job_processing() {
        let gate = Arc::new(Notify::new());
        let sink = Arc::new(StubSink::gated(gate.clone()));
        let (queue, _dir) = test_queue(sink.clone()).await;

        for i in 0..3 {
            let key = format!("documents/gated{}.pdf", i);
            upload_pdf(&queue, &key).await;
            queue.enqueue(Uuid::new_v4(), &key, "application/pdf").await;
        }

        // First job blocks in the sink; the rest must wait in pending.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let summary = queue.summary().await;
        assert_eq!(summary.processing, 1);
        assert_eq!(summary.pending, 2);

        // Release all jobs one by one
        for _ in 0..3 {
            gate.notify_one();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let summary = wait_until_drained(&queue).await;
        assert_eq!(summary.completed, 3);
        assert_eq!(sink.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_enqueue_restarts_worker_after_drain() {
        let sink = Arc::new(StubSink::new());
        let (queue, _dir) = test_queue(sink.clone()).await;

        upload_pdf(&queue, "documents/first.pdf").await;
        queue
            .enqueue(Uuid::new_v4(), "documents/first.pdf", "application/pdf")
            .await;
        wait_until_drained(&queue).await;

        // Worker has exited; a later enqueue must start a fresh loop.
        upload_pdf(&queue, "documents/second.pdf").await;
        queue
            .enqueue(Uuid::new_v4(), "documents/second.pdf", "application/pdf")
            .await;
        let summary = wait_until_drained(&queue).await;

        assert_eq!(summary.completed, 2);
    }

    #[tokio::test]
    async fn test_sweep_purges_old_finished_jobs_only() {
        let sink = Arc::new(StubSink::new());
        let (queue, _dir) = test_queue(sink).await;

        let old = Utc::now() - chrono::Duration::seconds(7200);

        queue
            .with_state(|state| {
                let mut stale = ExtractionJob::new(
                    Uuid::new_v4(),
                    "documents/old.pdf".to_string(),
                    "application/pdf".to_string(),
                );
                stale.status = JobStatus::Completed;
                stale.completed_at = Some(old);
                state.jobs.push(stale);

                let mut fresh = ExtractionJob::new(
                    Uuid::new_v4(),
                    "documents/fresh.pdf".to_string(),
                    "application/pdf".to_string(),
                );
                fresh.status = JobStatus::Failed;
                fresh.completed_at = Some(Utc::now());
                state.jobs.push(fresh);

                // Old but still pending: must never be swept
                let pending = ExtractionJob::new(
                    Uuid::new_v4(),
                    "documents/pending.pdf".to_string(),
                    "application/pdf".to_string(),
                );
                state.jobs.push(pending);
            })
            .await;

        queue.sweep_now().await;

        let summary = queue.summary().await;
        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.pending, 1);
    }

    #[tokio::test]
    async fn test_job_lookup_unknown_id() {
        let sink = Arc::new(StubSink::new());
        let (queue, _dir) = test_queue(sink).await;
        assert!(queue.job("no-such-job").await.is_none());
    }
}
