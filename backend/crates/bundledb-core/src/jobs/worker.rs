//! The serializing worker: the only process that writes bundles through the queue.
//!
//! One cycle lists pending jobs and handles them strictly one at a time:
//! fetch, dispatch on the payload, apply to the bundle, store, complete.

use super::apply::{extend_schema, insert_row, update_row};
use super::context::{JobContext, WorkerContext};
use super::job::{Job, JobPayload, UpdateSelector};
use super::queue::{FailOutcome, JobQueue};
use crate::error::{QueueError, Result};
use crate::query::determine_matches;
use bundledb_commons::helpers::now_secs;
use bundledb_commons::{Bundle, JobId, Row, RowId, TableName};
use bundledb_configs::{UpdateResolution, WorkerSettings};
use bundledb_filestore::BundleStore;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Result of handling one job id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Retrying,
    Failed,
    /// Listed but its body was gone; the marker is dropped.
    Missing,
}

/// Tally of one pass over the pending queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub listed: usize,
    pub completed: usize,
    pub retried: usize,
    pub failed: usize,
    pub missing: usize,
    /// Jobs whose handling hit a queue or storage error; left pending.
    pub errors: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Completed => self.completed += 1,
            JobOutcome::Retrying => self.retried += 1,
            JobOutcome::Failed => self.failed += 1,
            JobOutcome::Missing => self.missing += 1,
        }
    }

    /// True if at least one job left the state it was listed in.
    pub fn progressed(&self) -> bool {
        self.completed + self.retried + self.failed + self.missing > 0
    }

    fn merge(&mut self, other: CycleReport) {
        self.listed += other.listed;
        self.completed += other.completed;
        self.retried += other.retried;
        self.failed += other.failed;
        self.missing += other.missing;
        self.errors += other.errors;
    }
}

pub struct SerializingWorker {
    bundles: BundleStore,
    queue: Arc<dyn JobQueue>,
    settings: WorkerSettings,
    context: Arc<Mutex<WorkerContext>>,
    /// Jobs already applied to their bundle whose completion was not recorded.
    unsettled: Mutex<HashSet<JobId>>,
    shutdown: Arc<AtomicBool>,
}

impl SerializingWorker {
    pub fn new(bundles: BundleStore, queue: Arc<dyn JobQueue>, settings: WorkerSettings) -> Self {
        Self {
            bundles,
            queue,
            settings,
            context: Arc::new(Mutex::new(WorkerContext::new())),
            unsettled: Mutex::new(HashSet::new()),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Copy of the current progress counters.
    pub fn context(&self) -> WorkerContext {
        self.context.lock().clone()
    }

    /// Flag observed between jobs; setting it stops [`run_loop`](Self::run_loop).
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Poll the queue until shutdown.
    ///
    /// Errors inside a cycle are logged and the loop keeps going.
    pub async fn run_loop(&self) -> Result<()> {
        let poll_interval = Duration::from_millis(self.settings.poll_interval_ms.max(1));
        log::info!(
            "Serializing worker started (poll={}ms, update_resolution={:?})",
            poll_interval.as_millis(),
            self.settings.update_resolution
        );

        if self.settings.sweep_on_start {
            if let Err(e) = self.sweep().await {
                log::warn!("Startup queue sweep failed: {}", e);
            }
        }

        loop {
            if self.is_shutting_down() {
                log::info!("Shutdown signal received, stopping worker loop");
                break;
            }

            match self.run_cycle().await {
                Ok(report) if report.progressed() => {
                    log::debug!("Worker cycle: {:?}", report);
                },
                Ok(report) => {
                    if report.errors > 0 {
                        log::warn!("Worker cycle made no progress: {:?}", report);
                    }
                    tokio::time::sleep(poll_interval).await;
                },
                Err(e) => {
                    log::error!("Worker cycle failed: {}", e);
                    tokio::time::sleep(poll_interval).await;
                },
            }
        }
        Ok(())
    }

    /// List pending jobs once and handle each in order.
    ///
    /// A job whose handling errors is logged and counted in
    /// [`CycleReport::errors`]; the rest of the cycle still runs.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        self.context.lock().begin_cycle();
        let pending = self.queue.list_inactive().await?;
        let mut report = CycleReport {
            listed: pending.len(),
            ..Default::default()
        };
        for job_id in &pending {
            if self.is_shutting_down() {
                break;
            }
            match self.process(job_id).await {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    log::error!("[{}] Job left pending: {}", job_id, e);
                    report.errors += 1;
                },
            }
        }
        Ok(report)
    }

    /// Run cycles until the queue is empty or a cycle makes no progress.
    pub async fn drain(&self) -> Result<CycleReport> {
        let mut total = CycleReport::default();
        loop {
            let report = self.run_cycle().await?;
            total.merge(report);
            if report.listed == 0 || !report.progressed() || self.is_shutting_down() {
                return Ok(total);
            }
        }
    }

    /// Remove completion records and orphaned job bodies.
    pub async fn sweep(&self) -> Result<usize> {
        Ok(self.queue.sweep().await?)
    }

    /// Fetch, apply and settle one job.
    pub async fn process(&self, job_id: &JobId) -> Result<JobOutcome> {
        let job = match self.queue.fetch(job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                let dropped = self.queue.discard(job_id).await?;
                log::warn!("[{}] Listed job has no body, dropped {} marker(s)", job_id, dropped);
                return Ok(JobOutcome::Missing);
            },
            Err(QueueError::Malformed { key, reason }) => {
                self.queue.discard(job_id).await?;
                log::error!("[{}] Unreadable job body at {}, dropping: {}", job_id, key, reason);
                self.context.lock().record_failed(job_id);
                return Ok(JobOutcome::Failed);
            },
            Err(e) => return Err(e.into()),
        };

        let ctx = JobContext::new(job.job_id.clone(), job.job_type(), job.payload.tablename().clone());
        if self.unsettled.lock().contains(&job.job_id) {
            ctx.log_info("Already applied, recording completion");
            return self.settle(&ctx, &job, "Settled").await;
        }

        ctx.log_debug(&format!(
            "Processing {} (attempt {}/{})",
            ctx.job_type,
            job.attempts_made + 1,
            job.max_attempts
        ));

        match self.execute(&ctx, &job).await {
            Ok(summary) => self.settle(&ctx, &job, &summary).await,
            Err(e) => {
                let message = e.to_string();
                match self.queue.fail(&job, &message).await? {
                    FailOutcome::Retrying => {
                        ctx.log_warn(&format!("Attempt failed, will retry: {}", message));
                        self.context.lock().record_retry(&job.job_id);
                        Ok(JobOutcome::Retrying)
                    },
                    FailOutcome::Failed => {
                        ctx.log_error(&format!("Giving up after {} attempts: {}", job.max_attempts, message));
                        self.context.lock().record_failed(&job.job_id);
                        Ok(JobOutcome::Failed)
                    },
                }
            },
        }
    }

    /// Record completion of an applied job.
    ///
    /// If the completion record cannot be written the job is remembered as
    /// unsettled, so the next cycle retries the bookkeeping without applying
    /// it a second time. Purge failures only leave keys behind for
    /// [`sweep`](Self::sweep).
    async fn settle(&self, ctx: &JobContext, job: &Job, summary: &str) -> Result<JobOutcome> {
        if let Err(e) = self.queue.complete(job).await {
            self.unsettled.lock().insert(job.job_id.clone());
            ctx.log_error(&format!("Applied but not marked complete: {}", e));
            return Err(e.into());
        }
        self.unsettled.lock().remove(&job.job_id);

        let purged = match self.queue.purge_related(&job.job_id).await {
            Ok(purged) => purged,
            Err(e) => {
                ctx.log_warn(&format!("Purge failed, keys left for sweep: {}", e));
                0
            },
        };
        ctx.log_info(&format!("{} on {} (purged {} keys)", summary, ctx.tablename, purged));
        self.context.lock().record_completed(&job.job_id);
        Ok(JobOutcome::Completed)
    }

    async fn execute(&self, ctx: &JobContext, job: &Job) -> Result<String> {
        match &job.payload {
            JobPayload::NewRecord { tablename, data } => self.new_record(tablename, data.clone()).await,
            JobPayload::NewTable { tablename, fields } => self.new_table(tablename, fields).await,
            JobPayload::UpdateRows {
                tablename,
                row_ids,
                use_data,
                snapshot,
                selector,
            } => {
                let (bundle, targets) = self
                    .resolve_update(ctx, tablename, row_ids, snapshot.as_ref(), selector.as_ref())
                    .await?;
                self.update_rows(ctx, tablename, bundle, &targets, use_data).await
            },
        }
    }

    async fn new_record(&self, table: &TableName, data: Row) -> Result<String> {
        let mut bundle = self.bundles.load(table).await?;
        let row_id = insert_row(&mut bundle, table, data, now_secs());
        self.bundles.store(table, &bundle).await?;
        Ok(format!("Inserted row {}", row_id))
    }

    async fn new_table(&self, table: &TableName, fields: &[String]) -> Result<String> {
        let mut bundle = self.bundles.load(table).await?;
        let added = extend_schema(&mut bundle, table, fields);
        self.bundles.store(table, &bundle).await?;
        Ok(format!("Schema extended by {} fields", added))
    }

    /// Pick the bundle to mutate and the rows to touch, per the configured
    /// resolution mode.
    async fn resolve_update(
        &self,
        ctx: &JobContext,
        table: &TableName,
        row_ids: &[RowId],
        snapshot: Option<&Bundle>,
        selector: Option<&UpdateSelector>,
    ) -> Result<(Bundle, Vec<RowId>)> {
        match (self.settings.update_resolution, snapshot) {
            (UpdateResolution::Snapshot, Some(snapshot)) => Ok((snapshot.clone(), row_ids.to_vec())),
            (UpdateResolution::Snapshot, None) => {
                Ok((self.bundles.load(table).await?, row_ids.to_vec()))
            },
            (UpdateResolution::Fresh, _) => {
                let bundle = self.bundles.load(table).await?;
                let targets = match selector {
                    Some(selector) => {
                        let targets = determine_matches(&bundle, &selector.to_query()?);
                        if targets.len() != row_ids.len() {
                            ctx.log_info(&format!(
                                "Re-resolved {} rows (enqueued with {})",
                                targets.len(),
                                row_ids.len()
                            ));
                        }
                        targets
                    },
                    None => row_ids.to_vec(),
                };
                Ok((bundle, targets))
            },
        }
    }

    async fn update_rows(
        &self,
        ctx: &JobContext,
        table: &TableName,
        mut bundle: Bundle,
        targets: &[RowId],
        use_data: &Row,
    ) -> Result<String> {
        let now = now_secs();
        let mut updated = 0;
        for row_id in targets {
            if update_row(&mut bundle, table, *row_id, use_data, now) {
                updated += 1;
            } else {
                ctx.log_warn(&format!("Row {} not found, skipping", row_id));
            }
        }

        if updated > 0 {
            self.bundles.store(table, &bundle).await?;
        }
        Ok(format!("Updated {} rows", updated))
    }
}
