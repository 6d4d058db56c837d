//! Shared wiring of object store, bundle store, job queue and table service.
//!
//! Built once at startup and handed to the HTTP layer and, when embedded, to the
//! worker. Both ends of the queue see the same object store.

use crate::coordinator::TableService;
use crate::error::Result;
use crate::jobs::{JobQueue, ObjectStoreJobQueue, SerializingWorker};
use bundledb_configs::ServerConfig;
use bundledb_filestore::{build_object_store, is_remote_backend, BundleStore, RetryPolicy};
use object_store::ObjectStore;
use std::sync::Arc;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppContext {
    config: Arc<ServerConfig>,
    bundles: BundleStore,
    queue: Arc<dyn JobQueue>,
    tables: Arc<TableService>,
    started_at: std::time::Instant,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("backend", &self.config.storage.backend)
            .field("bundles", &self.bundles)
            .finish()
    }
}

impl AppContext {
    /// Build the object store described by `config.storage` and wire everything on it.
    pub fn from_config(config: ServerConfig) -> Result<Arc<Self>> {
        let store = build_object_store(&config.storage)?;
        log::info!(
            "Object store ready (backend={}, suffix={})",
            config.storage.backend.as_str(),
            config.storage.bundle_suffix
        );
        Ok(Self::with_object_store(config, store))
    }

    /// Wire an already built object store (tests, embedding).
    pub fn with_object_store(config: ServerConfig, store: Arc<dyn ObjectStore>) -> Arc<Self> {
        let retry = RetryPolicy::from(&config.retry);
        let bundles = BundleStore::new(Arc::clone(&store), config.storage.bundle_suffix.clone(), retry)
            .with_content_encoding(is_remote_backend(config.storage.backend));
        let queue: Arc<dyn JobQueue> =
            Arc::new(ObjectStoreJobQueue::new(Arc::clone(&store), &config.queue, retry));
        let tables = Arc::new(TableService::new(
            bundles.clone(),
            Arc::clone(&queue),
            config.worker.update_resolution,
        ));

        Arc::new(Self {
            config: Arc::new(config),
            bundles,
            queue,
            tables,
            started_at: std::time::Instant::now(),
        })
    }

    pub fn config(&self) -> &Arc<ServerConfig> {
        &self.config
    }

    pub fn bundles(&self) -> &BundleStore {
        &self.bundles
    }

    pub fn queue(&self) -> Arc<dyn JobQueue> {
        Arc::clone(&self.queue)
    }

    pub fn tables(&self) -> Arc<TableService> {
        Arc::clone(&self.tables)
    }

    /// A worker sharing this context's bundle store and queue.
    pub fn worker(&self) -> SerializingWorker {
        SerializingWorker::new(self.bundles.clone(), Arc::clone(&self.queue), self.config.worker.clone())
    }

    pub fn version(&self) -> &'static str {
        SERVER_VERSION
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobPayload;
    use crate::query::{Constraints, Query};
    use crate::test_helpers::{memory_app_context, row};
    use bundledb_commons::{RowId, TableName};
    use bundledb_configs::StorageBackend;
    use serde_json::json;

    fn selector(constraints: serde_json::Value) -> crate::jobs::UpdateSelector {
        crate::jobs::UpdateSelector {
            constraints,
            strict: false,
            operator: None,
            pagination: None,
        }
    }

    #[tokio::test]
    async fn test_users_scenario_end_to_end() {
        let ctx = memory_app_context();
        let worker = ctx.worker();
        let tables = ctx.tables();
        let users = TableName::new("users");

        tables.new_table(&users, vec!["name".into(), "age".into()]).await.unwrap();
        tables.new_record(&users, row(json!({"name": "Ann", "age": 30}))).await.unwrap();
        tables.new_record(&users, row(json!({"name": "Bo", "age": 25}))).await.unwrap();
        assert_eq!(worker.drain().await.unwrap().completed, 3);

        let by_age = Query::new(Constraints::parse(&json!({"age": [20, 28]}), false).unwrap());
        let rows = tables.fetch_records(&users, &by_age, None).await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Bo"));
        assert_eq!(rows[0]["row_id"], json!(2));

        let by_name = Query::new(Constraints::parse(&json!({"name": "an"}), false).unwrap());
        let rows = tables.fetch_records(&users, &by_name, None).await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Ann"));

        let outcome = tables
            .update_records(&users, selector(json!({"name": "bo"})), row(json!({"age": 26})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.matched, 1);
        worker.drain().await.unwrap();

        let rows = tables.fetch_records(&users, &by_age, None).await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["age"], json!(26));
        assert!(rows[0]["__updated_at__"].is_number());
        let bundle = ctx.bundles().load(&users).await.unwrap();
        assert!(bundle.index["age"].get("25").is_none());

        tables.delete_records(&users, selector(json!({"name": "ann"}))).await.unwrap();
        worker.drain().await.unwrap();
        let rows = tables.get_rows(&users, &[json!(1), json!(2)], None).await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Bo"));
        assert!(ctx.bundles().load(&users).await.unwrap().table.contains_key(&RowId::new(1)));
    }

    #[tokio::test]
    async fn test_fresh_mode_enqueues_without_snapshot() {
        let mut config = ServerConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.worker.update_resolution = bundledb_configs::UpdateResolution::Fresh;
        let ctx = AppContext::with_object_store(config, Arc::new(object_store::memory::InMemory::new()));
        let users = TableName::new("users");
        ctx.bundles().store(&users, &crate::test_helpers::users_bundle()).await.unwrap();

        let outcome = ctx
            .tables()
            .update_records(&users, selector(json!("*")), row(json!({"age": 1})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.matched, 2);
        let job = ctx.queue().fetch(&outcome.job_id.unwrap()).await.unwrap().unwrap();
        assert!(matches!(
            job.payload,
            JobPayload::UpdateRows { snapshot: None, selector: Some(_), .. }
        ));
    }
}
