use crate::error::Result;
use crate::query::{Constraints, Operator, Pagination, Query};
use bundledb_commons::{Bundle, JobId, JobType, Row, RowId, TableName};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A queued mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub priority: String,
    pub max_attempts: u32,
    #[serde(default)]
    pub attempts_made: u32,
    /// Enqueue time in epoch microseconds; orders the queue.
    pub created_at: i64,
    #[serde(default)]
    pub last_error: Option<String>,
    pub payload: JobPayload,
}

impl Job {
    pub fn job_type(&self) -> JobType {
        self.payload.job_type()
    }

    pub fn attempts_left(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts_made)
    }
}

/// Constraints an update job re-resolves against a fresh bundle read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSelector {
    pub constraints: Value,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl UpdateSelector {
    /// Rebuild the query the row ids were originally resolved with.
    pub fn to_query(&self) -> Result<Query> {
        let constraints = Constraints::parse(&self.constraints, self.strict)?;
        Ok(Query::new(constraints)
            .strict(self.strict)
            .operator(Operator::parse(self.operator.as_deref()))
            .paginate(self.pagination))
    }
}

/// What a job does.
///
/// Externally tagged (`{"new_record": {...}}`) so that row-id map keys inside
/// snapshot bundles decode without buffering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPayload {
    /// Insert `data` as a new row.
    NewRecord { tablename: TableName, data: Row },
    /// Overwrite `use_data` on already-resolved rows.
    UpdateRows {
        tablename: TableName,
        row_ids: Vec<RowId>,
        use_data: Row,
        /// Bundle the row ids were resolved against.
        #[serde(default)]
        snapshot: Option<Bundle>,
        #[serde(default)]
        selector: Option<UpdateSelector>,
    },
    /// Create the bundle if absent and merge `fields` into its schema.
    NewTable {
        tablename: TableName,
        fields: Vec<String>,
    },
}

impl JobPayload {
    pub fn job_type(&self) -> JobType {
        match self {
            JobPayload::NewRecord { .. } => JobType::NewRecord,
            JobPayload::UpdateRows { .. } => JobType::UpdateRows,
            JobPayload::NewTable { .. } => JobType::NewTable,
        }
    }

    pub fn tablename(&self) -> &TableName {
        match self {
            JobPayload::NewRecord { tablename, .. }
            | JobPayload::UpdateRows { tablename, .. }
            | JobPayload::NewTable { tablename, .. } => tablename,
        }
    }
}
