//! Write serialization: jobs, the queue and the single worker that applies them.
//!
//! The API side only enqueues. The worker drains the queue one job at a time, so
//! no two writers ever read-modify-write the same bundle concurrently.

pub mod apply;
mod context;
mod job;
mod queue;
mod worker;

pub use context::{JobContext, WorkerContext};
pub use job::{Job, JobPayload, UpdateSelector};
pub use queue::{FailOutcome, JobQueue, ObjectStoreJobQueue, QueueResult};
pub use worker::{CycleReport, JobOutcome, SerializingWorker};
