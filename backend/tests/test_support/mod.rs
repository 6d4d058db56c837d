//! Shared helpers for backend integration tests.

#![allow(dead_code)]

use bundledb_configs::{ServerConfig, StorageBackend};
use bundledb_core::AppContext;
use bundledb_server::lifecycle::{run_for_tests, RunningTestHttpServer};
use object_store::memory::InMemory;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// In-memory config with fast retries and no embedded worker.
pub fn memory_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.storage.backend = StorageBackend::Memory;
    config.retry.max_attempts = 1;
    config.worker.embedded = false;
    config.worker.poll_interval_ms = 5;
    config.server.host = "127.0.0.1".to_string();
    config
}

/// Config rooted at `dir` on the local filesystem.
pub fn local_config(dir: &Path) -> ServerConfig {
    let mut config = memory_config();
    config.storage.backend = StorageBackend::Local;
    config.storage.data_path = dir.to_string_lossy().into_owned();
    config
}

/// Start an HTTP server over a fresh in-memory store.
pub async fn start_memory_server() -> RunningTestHttpServer {
    let config = memory_config();
    let ctx = AppContext::with_object_store(config.clone(), Arc::new(InMemory::new()));
    run_for_tests(&config, ctx).await.expect("start test server")
}

/// POST `body` to `{api_url}/{route}` and return (status, json body).
pub async fn post_json(server: &RunningTestHttpServer, route: &str, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{}/{}", server.api_url(), route))
        .json(&body)
        .send()
        .await
        .expect("send request");
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("json body"))
}

/// GET `{api_url}/{route}` and return (status, json body).
pub async fn get_json(server: &RunningTestHttpServer, route: &str) -> (u16, Value) {
    let resp = reqwest::get(format!("{}/{}", server.api_url(), route))
        .await
        .expect("send request");
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("json body"))
}
