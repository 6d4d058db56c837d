use bundledb_commons::helpers::now_secs;
use bundledb_commons::{JobId, JobType, TableName};
use log::{debug, error, info, warn};
use serde::Serialize;

/// Progress of a worker loop.
///
/// Owned by the worker and shared read-only with whoever reports health.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkerContext {
    pub started_at: i64,
    pub cycles: u64,
    pub processed: u64,
    pub retried: u64,
    pub failed: u64,
    pub last_job: Option<JobId>,
    pub last_cycle_at: Option<i64>,
}

impl WorkerContext {
    pub fn new() -> Self {
        Self {
            started_at: now_secs(),
            ..Default::default()
        }
    }

    pub fn begin_cycle(&mut self) {
        self.cycles += 1;
        self.last_cycle_at = Some(now_secs());
    }

    pub fn record_completed(&mut self, job_id: &JobId) {
        self.processed += 1;
        self.last_job = Some(job_id.clone());
    }

    pub fn record_retry(&mut self, job_id: &JobId) {
        self.retried += 1;
        self.last_job = Some(job_id.clone());
    }

    pub fn record_failed(&mut self, job_id: &JobId) {
        self.failed += 1;
        self.last_job = Some(job_id.clone());
    }
}

/// Per-job logging helper; every line is prefixed with `[job_id]`.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: JobId,
    pub job_type: JobType,
    pub tablename: TableName,
}

impl JobContext {
    pub fn new(job_id: JobId, job_type: JobType, tablename: TableName) -> Self {
        Self {
            job_id,
            job_type,
            tablename,
        }
    }

    pub fn log_debug(&self, message: &str) {
        debug!("[{}] {}", self.job_id, message);
    }

    pub fn log_info(&self, message: &str) {
        info!("[{}] {}", self.job_id, message);
    }

    pub fn log_warn(&self, message: &str) {
        warn!("[{}] {}", self.job_id, message);
    }

    pub fn log_error(&self, message: &str) {
        error!("[{}] {}", self.job_id, message);
    }
}
