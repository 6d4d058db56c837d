//! Job queue backed by the same object store as the bundles.
//!
//! Layout under the configured prefix:
//!
//! ```text
//! {prefix}/jobs/{job_id}                        job body (JSON)
//! {prefix}/inactive/{created_at:020}_{job_id}   pending marker, lists in FIFO order
//! {prefix}/complete/{job_id}                    completion record
//! {prefix}/failed/{job_id}                      terminal failure (job body + last error)
//! ```

use super::job::{Job, JobPayload};
use crate::error::QueueError;
use async_trait::async_trait;
use bundledb_commons::helpers::{now_micros, now_secs};
use bundledb_commons::JobId;
use bundledb_configs::QueueSettings;
use bundledb_filestore::object_store_ops::{
    delete_object, list_keys, object_path, read_object, write_object,
};
use bundledb_filestore::RetryPolicy;
use bytes::Bytes;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;

pub type QueueResult<T> = std::result::Result<T, QueueError>;

const JOBS_DIR: &str = "jobs";
const INACTIVE_DIR: &str = "inactive";
const COMPLETE_DIR: &str = "complete";
const FAILED_DIR: &str = "failed";

/// Bodies without a pending marker are only swept once they are this old,
/// so a body whose marker is still being written survives.
const ORPHAN_GRACE_MICROS: i64 = 60 * 1_000_000;

/// What happened to a job after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOutcome {
    /// Still pending; picked up again next cycle.
    Retrying,
    /// Out of attempts; moved to the failed set.
    Failed,
}

/// Durable FIFO of pending mutations.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Persist a new job and return its id.
    async fn enqueue(&self, payload: JobPayload) -> QueueResult<JobId>;

    /// Pending job ids, oldest first.
    async fn list_inactive(&self) -> QueueResult<Vec<JobId>>;

    /// Load a job body; `None` if it no longer exists.
    async fn fetch(&self, job_id: &JobId) -> QueueResult<Option<Job>>;

    /// Record success and drop the pending marker.
    async fn complete(&self, job: &Job) -> QueueResult<()>;

    /// Record a failed attempt.
    async fn fail(&self, job: &Job, error: &str) -> QueueResult<FailOutcome>;

    /// Drop every pending marker for `job_id`. Returns how many were removed.
    async fn discard(&self, job_id: &JobId) -> QueueResult<usize>;

    /// Delete every backing key that mentions `job_id`, failure records excepted.
    async fn purge_related(&self, job_id: &JobId) -> QueueResult<usize>;

    /// Remove completion records and orphaned bodies. Pending jobs are kept.
    async fn sweep(&self) -> QueueResult<usize>;
}

/// [`JobQueue`] stored as small JSON objects in an [`ObjectStore`].
pub struct ObjectStoreJobQueue {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    priority: String,
    max_attempts: u32,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ObjectStoreJobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreJobQueue")
            .field("prefix", &self.prefix)
            .field("priority", &self.priority)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl ObjectStoreJobQueue {
    pub fn new(store: Arc<dyn ObjectStore>, settings: &QueueSettings, retry: RetryPolicy) -> Self {
        Self {
            store,
            prefix: settings.prefix.trim_matches('/').to_string(),
            priority: settings.priority.clone(),
            max_attempts: settings.attempts.max(1),
            retry,
        }
    }

    fn key(&self, dir: &str, name: &str) -> QueueResult<ObjectPath> {
        Ok(object_path(&format!("{}/{}/{}", self.prefix, dir, name))?)
    }

    fn dir(&self, dir: &str) -> QueueResult<ObjectPath> {
        Ok(object_path(&format!("{}/{}", self.prefix, dir))?)
    }

    fn marker_name(job: &Job) -> String {
        format!("{:020}_{}", job.created_at.max(0), job.job_id)
    }

    async fn put(&self, key: ObjectPath, data: Vec<u8>) -> QueueResult<()> {
        let data = Bytes::from(data);
        let what = format!("queue put {}", key);
        self.retry
            .run(&what, move || {
                let store = Arc::clone(&self.store);
                let key = key.clone();
                let data = data.clone();
                async move { write_object(store.as_ref(), &key, data, None).await }
            })
            .await?;
        Ok(())
    }

    async fn get(&self, key: ObjectPath) -> QueueResult<Option<Bytes>> {
        let what = format!("queue get {}", key);
        let raw = self
            .retry
            .run(&what, move || {
                let store = Arc::clone(&self.store);
                let key = key.clone();
                async move { read_object(store.as_ref(), &key).await }
            })
            .await?;
        Ok(raw)
    }

    async fn remove(&self, key: ObjectPath) -> QueueResult<()> {
        let what = format!("queue delete {}", key);
        self.retry
            .run(&what, move || {
                let store = Arc::clone(&self.store);
                let key = key.clone();
                async move { delete_object(store.as_ref(), &key).await }
            })
            .await?;
        Ok(())
    }

    async fn list(&self, prefix: ObjectPath) -> QueueResult<Vec<ObjectPath>> {
        let what = format!("queue list {}", prefix);
        let keys = self
            .retry
            .run(&what, move || {
                let store = Arc::clone(&self.store);
                let prefix = prefix.clone();
                async move { list_keys(store.as_ref(), &prefix).await }
            })
            .await?;
        Ok(keys)
    }
}

/// Last path segment of a key.
fn file_name(key: &ObjectPath) -> Option<String> {
    key.filename().map(str::to_string)
}

#[async_trait]
impl JobQueue for ObjectStoreJobQueue {
    async fn enqueue(&self, payload: JobPayload) -> QueueResult<JobId> {
        let job = Job {
            job_id: JobId::generate(payload.job_type()),
            priority: self.priority.clone(),
            max_attempts: self.max_attempts,
            attempts_made: 0,
            created_at: now_micros(),
            last_error: None,
            payload,
        };

        // Body first so a listed marker always has something to fetch.
        self.put(self.key(JOBS_DIR, job.job_id.as_str())?, serde_json::to_vec(&job)?)
            .await?;
        self.put(self.key(INACTIVE_DIR, &Self::marker_name(&job))?, Vec::new())
            .await?;

        log::debug!(
            "[{}] Enqueued {} job for table {}",
            job.job_id,
            job.job_type(),
            job.payload.tablename()
        );
        Ok(job.job_id)
    }

    async fn list_inactive(&self) -> QueueResult<Vec<JobId>> {
        let keys = self.list(self.dir(INACTIVE_DIR)?).await?;
        let mut ids = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(name) = file_name(&key) else {
                continue;
            };
            let parsed = name
                .split_once('_')
                .ok_or_else(|| "missing timestamp".to_string())
                .and_then(|(_, id)| JobId::parse(id).map_err(|e| e.to_string()));
            match parsed {
                Ok(id) => ids.push(id),
                Err(reason) => {
                    log::warn!("Skipping malformed queue marker {}: {}", key, reason);
                },
            }
        }
        Ok(ids)
    }

    async fn fetch(&self, job_id: &JobId) -> QueueResult<Option<Job>> {
        let key = self.key(JOBS_DIR, job_id.as_str())?;
        let Some(raw) = self.get(key.clone()).await? else {
            return Ok(None);
        };
        let job = serde_json::from_slice::<Job>(&raw).map_err(|e| QueueError::Malformed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(job))
    }

    async fn complete(&self, job: &Job) -> QueueResult<()> {
        let record = serde_json::json!({
            "job_id": job.job_id,
            "job_type": job.job_type().as_str(),
            "tablename": job.payload.tablename(),
            "attempts_made": job.attempts_made + 1,
            "completed_at": now_secs(),
        });
        self.put(self.key(COMPLETE_DIR, job.job_id.as_str())?, serde_json::to_vec(&record)?)
            .await?;
        self.remove(self.key(INACTIVE_DIR, &Self::marker_name(job))?)
            .await
    }

    async fn fail(&self, job: &Job, error: &str) -> QueueResult<FailOutcome> {
        let mut updated = job.clone();
        updated.attempts_made += 1;
        updated.last_error = Some(error.to_string());

        if updated.attempts_made < updated.max_attempts {
            self.put(self.key(JOBS_DIR, job.job_id.as_str())?, serde_json::to_vec(&updated)?)
                .await?;
            return Ok(FailOutcome::Retrying);
        }

        self.put(self.key(FAILED_DIR, job.job_id.as_str())?, serde_json::to_vec(&updated)?)
            .await?;
        self.remove(self.key(INACTIVE_DIR, &Self::marker_name(job))?)
            .await?;
        self.remove(self.key(JOBS_DIR, job.job_id.as_str())?).await?;
        Ok(FailOutcome::Failed)
    }

    async fn discard(&self, job_id: &JobId) -> QueueResult<usize> {
        let suffix = format!("_{}", job_id);
        let mut removed = 0;
        for key in self.list(self.dir(INACTIVE_DIR)?).await? {
            if file_name(&key).is_some_and(|name| name.ends_with(&suffix)) {
                self.remove(key).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn purge_related(&self, job_id: &JobId) -> QueueResult<usize> {
        let failed_dir = format!("{}/{}/", self.prefix, FAILED_DIR);
        let keys = self.list(object_path(&self.prefix)?).await?;
        let mut removed = 0;
        for key in keys {
            let path = key.to_string();
            if path.starts_with(&failed_dir) || !path.contains(job_id.as_str()) {
                continue;
            }
            self.remove(key).await?;
            removed += 1;
        }
        Ok(removed)
    }

    async fn sweep(&self) -> QueueResult<usize> {
        let mut removed = 0;

        let mut completed = Vec::new();
        for key in self.list(self.dir(COMPLETE_DIR)?).await? {
            completed.extend(file_name(&key));
            self.remove(key).await?;
            removed += 1;
        }

        // Bodies are listed before markers: enqueue writes the body first.
        let bodies = self.list(self.dir(JOBS_DIR)?).await?;
        let pending: Vec<JobId> = self.list_inactive().await?;
        let cutoff = now_micros() - ORPHAN_GRACE_MICROS;
        for key in bodies {
            let Some(name) = file_name(&key) else {
                continue;
            };
            if pending.iter().any(|id| id.as_str() == name) {
                continue;
            }
            if !completed.contains(&name) {
                let Some(raw) = self.get(key.clone()).await? else {
                    continue;
                };
                match serde_json::from_slice::<Job>(&raw) {
                    Ok(job) if job.created_at > cutoff => continue,
                    Ok(_) => {},
                    Err(e) => log::warn!("Sweeping unreadable job body {}: {}", key, e),
                }
            }
            self.remove(key).await?;
            removed += 1;
        }

        if removed > 0 {
            log::info!("Queue sweep removed {} stale keys", removed);
        }
        Ok(removed)
    }
}
