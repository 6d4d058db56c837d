//! API-side entry points.
//!
//! Reads go straight to the object store. Every mutation except `flush_table` is
//! packaged as a job for the serializing worker, so request handlers never
//! write a bundle that the worker might be rewriting.

use crate::error::Result;
use crate::jobs::{JobPayload, JobQueue, UpdateSelector};
use crate::query::{apply_restrict, determine_matches, materialize, Query};
use bundledb_commons::helpers::new_token;
use bundledb_commons::{JobId, Register, Row, RowId, TableName, RESERVED_PRIVATE};
use bundledb_configs::UpdateResolution;
use bundledb_filestore::BundleStore;
use serde_json::Value;
use std::sync::Arc;

/// Outcome of a matched mutation (`update_records` / `delete_records`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedUpdate {
    pub matched: usize,
    /// `None` when nothing matched and no job was enqueued.
    pub job_id: Option<JobId>,
}

/// Table operations exposed over HTTP.
pub struct TableService {
    bundles: BundleStore,
    queue: Arc<dyn JobQueue>,
    resolution: UpdateResolution,
}

impl TableService {
    pub fn new(bundles: BundleStore, queue: Arc<dyn JobQueue>, resolution: UpdateResolution) -> Self {
        Self {
            bundles,
            queue,
            resolution,
        }
    }

    /// Schema of `table`, or `None` if it has never been written.
    pub async fn get_register(&self, table: &TableName) -> Result<Option<Register>> {
        Ok(self.bundles.load_existing(table).await?.map(|b| b.register))
    }

    /// Enqueue creation of `table` (or extension of its schema).
    pub async fn new_table(&self, table: &TableName, fields: Vec<String>) -> Result<JobId> {
        let fields = fields.into_iter().filter(|f| !f.trim().is_empty()).collect();
        let job_id = self
            .queue
            .enqueue(JobPayload::NewTable {
                tablename: table.clone(),
                fields,
            })
            .await?;
        Ok(job_id)
    }

    /// Stamp `<table>_id` on `data` and enqueue the insert.
    ///
    /// Returns the job id and the data as it will be stored, before the worker
    /// adds the remaining reserved fields.
    pub async fn new_record(&self, table: &TableName, mut data: Row) -> Result<(JobId, Row)> {
        data.insert(table.id_field(), Value::String(new_token()));
        let job_id = self
            .queue
            .enqueue(JobPayload::NewRecord {
                tablename: table.clone(),
                data: data.clone(),
            })
            .await?;
        Ok((job_id, data))
    }

    /// Visible rows of `table` matching `query`, projected onto `restrict`.
    ///
    /// `None` if the table does not exist.
    pub async fn fetch_records(
        &self,
        table: &TableName,
        query: &Query,
        restrict: Option<&[String]>,
    ) -> Result<Option<Vec<Row>>> {
        let Some(bundle) = self.bundles.load_existing(table).await? else {
            return Ok(None);
        };
        let ids = determine_matches(&bundle, query);
        let rows = materialize(&bundle, &ids)
            .into_iter()
            .map(|row| apply_restrict(row, restrict))
            .collect();
        Ok(Some(rows))
    }

    /// Match rows now and enqueue an overwrite of `use_data` on them.
    ///
    /// `None` if the table does not exist. Nothing is enqueued when no row
    /// matched.
    pub async fn update_records(
        &self,
        table: &TableName,
        selector: UpdateSelector,
        use_data: Row,
    ) -> Result<Option<MatchedUpdate>> {
        let Some(bundle) = self.bundles.load_existing(table).await? else {
            return Ok(None);
        };
        let row_ids: Vec<RowId> = determine_matches(&bundle, &selector.to_query()?);
        if row_ids.is_empty() {
            return Ok(Some(MatchedUpdate {
                matched: 0,
                job_id: None,
            }));
        }

        let matched = row_ids.len();
        let snapshot = match self.resolution {
            UpdateResolution::Snapshot => Some(bundle),
            UpdateResolution::Fresh => None,
        };
        let job_id = self
            .queue
            .enqueue(JobPayload::UpdateRows {
                tablename: table.clone(),
                row_ids,
                use_data,
                snapshot,
                selector: Some(selector),
            })
            .await?;
        Ok(Some(MatchedUpdate {
            matched,
            job_id: Some(job_id),
        }))
    }

    /// Soft delete: an update setting `__private__` to 1.
    pub async fn delete_records(
        &self,
        table: &TableName,
        selector: UpdateSelector,
    ) -> Result<Option<MatchedUpdate>> {
        let mut use_data = Row::new();
        use_data.insert(RESERVED_PRIVATE.to_string(), Value::from(1));
        self.update_records(table, selector, use_data).await
    }

    /// Direct lookup by row id, in request order.
    ///
    /// Ids that are not non-negative integers (or their decimal strings) are
    /// skipped, as are private and missing rows.
    pub async fn get_rows(
        &self,
        table: &TableName,
        row_ids: &[Value],
        restrict: Option<&[String]>,
    ) -> Result<Option<Vec<Row>>> {
        let Some(bundle) = self.bundles.load_existing(table).await? else {
            return Ok(None);
        };
        let mut rows = Vec::with_capacity(row_ids.len());
        for raw in row_ids {
            let Some(row_id) = RowId::from_json(raw) else {
                log::warn!("Skipping unparseable row id {} for {}", raw, table);
                continue;
            };
            if let Some(row) = bundle.visible_row(&row_id) {
                rows.push(apply_restrict(row.clone(), restrict));
            }
        }
        Ok(Some(rows))
    }

    /// Reset rows, index and counter, keeping the schema.
    ///
    /// Bypasses the queue. Returns `false` if the table does not exist.
    pub async fn flush_table(&self, table: &TableName) -> Result<bool> {
        let Some(mut bundle) = self.bundles.load_existing(table).await? else {
            return Ok(false);
        };
        bundle.flush();
        self.bundles.store(table, &bundle).await?;
        log::info!("Flushed table {}", table);
        Ok(true)
    }
}
