//! ObjectStore factory for the configured storage backend.
//!
//! Every backend is exposed as `Arc<dyn ObjectStore>`, so bundle and queue code
//! never branch on where the bytes live.

use crate::error::{FilestoreError, Result};
use bundledb_configs::{StorageBackend, StorageSettings};
use object_store::aws::{AmazonS3Builder, AmazonS3ConfigKey};
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::{ClientOptions, ObjectStore};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const S3_SSE_KEY: &str = "aws_server_side_encryption";
const S3_SSE_AES256: &str = "AES256";

/// Build the object store described by `settings`.
pub fn build_object_store(settings: &StorageSettings) -> Result<Arc<dyn ObjectStore>> {
    match settings.backend {
        StorageBackend::Local => build_local(&settings.data_path),
        StorageBackend::Memory => Ok(Arc::new(InMemory::new()) as Arc<dyn ObjectStore>),
        StorageBackend::S3 => build_s3(settings),
    }
}

/// True for backends that accept object attributes such as `Content-Encoding`.
///
/// `LocalFileSystem` rejects attributes on put.
pub fn is_remote_backend(backend: StorageBackend) -> bool {
    !matches!(backend, StorageBackend::Local)
}

fn build_local(base: &str) -> Result<Arc<dyn ObjectStore>> {
    let base = base.trim();
    if base.is_empty() {
        return Err(FilestoreError::Config(
            "Local storage requires non-empty data_path".into(),
        ));
    }

    let path = PathBuf::from(base);
    if !path.exists() {
        std::fs::create_dir_all(&path).map_err(|e| {
            FilestoreError::Config(format!(
                "Failed to create storage directory '{}': {}",
                path.display(),
                e
            ))
        })?;
    }

    let absolute_path = path.canonicalize().map_err(|e| {
        FilestoreError::Config(format!(
            "Failed to resolve absolute path for '{}': {}",
            path.display(),
            e
        ))
    })?;

    LocalFileSystem::new_with_prefix(absolute_path)
        .map(|fs| Arc::new(fs) as Arc<dyn ObjectStore>)
        .map_err(|e| FilestoreError::Config(format!("LocalFileSystem: {e}")))
}

fn build_s3(settings: &StorageSettings) -> Result<Arc<dyn ObjectStore>> {
    let bucket = settings
        .bucket
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| FilestoreError::Config("S3 storage requires a bucket".into()))?;

    // Credentials fall back to AWS_* environment variables.
    let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

    if let Some(region) = &settings.region {
        builder = builder.with_region(region);
    }

    if let Some(endpoint) = &settings.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_virtual_hosted_style_request(false);
        if endpoint.starts_with("http://") {
            builder = builder.with_allow_http(true);
        }
    }

    if let Some(ak) = &settings.access_key_id {
        builder = builder.with_access_key_id(ak);
    }
    if let Some(sk) = &settings.secret_access_key {
        builder = builder.with_secret_access_key(sk);
    }

    if settings.server_side_encryption {
        let key = AmazonS3ConfigKey::from_str(S3_SSE_KEY)
            .map_err(|e| FilestoreError::Config(format!("S3 encryption: {e}")))?;
        builder = builder.with_config(key, S3_SSE_AES256);
    }

    let client_options = ClientOptions::new()
        .with_timeout(Duration::from_secs(settings.timeout_secs))
        .with_connect_timeout(Duration::from_secs(settings.timeout_secs.min(10)));
    builder = builder.with_client_options(client_options);

    let store = builder.build().map_err(|e| FilestoreError::Config(format!("S3: {}", e)))?;
    Ok(Arc::new(store) as Arc<dyn ObjectStore>)
}
