//! # bundledb-core
//!
//! The database proper:
//!
//! - [`index`]: inverted index maintenance on insert and update
//! - [`query`]: constraint normalization, range/partial matching, AND/OR
//!   combination and pagination
//! - [`jobs`]: the job queue and the serializing worker, the only writer of
//!   bundles besides `flush_table`
//! - [`coordinator`]: API-side entry points that read bundles, match rows and
//!   enqueue mutations
//! - [`app_context`]: wiring of object store, bundle store, queue and services

pub mod app_context;
pub mod coordinator;
pub mod error;
pub mod index;
pub mod jobs;
pub mod query;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use app_context::AppContext;
pub use coordinator::{MatchedUpdate, TableService};
pub use error::{BundleDbError, QueueError, Result};
pub use jobs::{
    CycleReport, Job, JobOutcome, JobPayload, JobQueue, ObjectStoreJobQueue, SerializingWorker,
    UpdateSelector, WorkerContext,
};
pub use query::{determine_matches, Constraints, Operator, Pagination, Query};
