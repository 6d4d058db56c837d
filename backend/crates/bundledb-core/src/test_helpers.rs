//! Test helpers compiled only for bundledb-core unit tests.

use crate::app_context::AppContext;
use crate::jobs::apply::{extend_schema, insert_row};
use bundledb_commons::{Bundle, Row, TableName};
use bundledb_configs::{ServerConfig, StorageBackend};
use bundledb_filestore::{BundleStore, RetryPolicy};
use object_store::memory::InMemory;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap_or_default()
}

/// `users` with schema `[name, age]`, Ann (row 1, age 30) and Bo (row 2, age 25).
pub fn users_bundle() -> Bundle {
    let users = TableName::new("users");
    let mut bundle = Bundle::empty();
    extend_schema(&mut bundle, &users, &["name".to_string(), "age".to_string()]);
    insert_row(&mut bundle, &users, row(json!({"name": "Ann", "age": 30})), 1);
    insert_row(&mut bundle, &users, row(json!({"name": "Bo", "age": 25})), 2);
    bundle
}

/// Bundle store over a fresh in-memory object store, without retries.
pub fn memory_bundles() -> BundleStore {
    BundleStore::new(Arc::new(InMemory::new()), "bundle", RetryPolicy::none())
        .with_content_encoding(true)
}

/// AppContext over a fresh in-memory object store.
pub fn memory_app_context() -> Arc<AppContext> {
    let mut config = ServerConfig::default();
    config.storage.backend = StorageBackend::Memory;
    config.retry.max_attempts = 1;
    config.worker.poll_interval_ms = 5;
    AppContext::with_object_store(config, Arc::new(InMemory::new()))
}
