//! One compressed bundle per table, keyed `<tablename>.<suffix>`.

use crate::bundle_codec::{decode_bundle, encode_bundle, CONTENT_ENCODING};
use crate::error::Result;
use crate::object_store_ops::{object_path, read_object, write_object};
use crate::retry::RetryPolicy;
use bundledb_commons::{Bundle, TableName};
use bytes::Bytes;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;

/// Loads and stores table bundles in an object store.
#[derive(Clone)]
pub struct BundleStore {
    store: Arc<dyn ObjectStore>,
    suffix: String,
    retry: RetryPolicy,
    content_encoding: bool,
}

impl std::fmt::Debug for BundleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleStore")
            .field("store", &self.store.to_string())
            .field("suffix", &self.suffix)
            .field("retry", &self.retry)
            .finish()
    }
}

impl BundleStore {
    pub fn new(store: Arc<dyn ObjectStore>, suffix: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            store,
            suffix: suffix.into(),
            retry,
            content_encoding: false,
        }
    }

    /// Attach `Content-Encoding: gzip` to written objects.
    ///
    /// Only enable for backends that accept attributes.
    pub fn with_content_encoding(mut self, enabled: bool) -> Self {
        self.content_encoding = enabled;
        self
    }

    pub fn object_store(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Object key of `table`'s bundle.
    pub fn key_for(&self, table: &TableName) -> Result<ObjectPath> {
        object_path(&format!("{}.{}", table.as_str(), self.suffix))
    }

    /// Load a bundle, or `None` if the table has never been written.
    pub async fn load_existing(&self, table: &TableName) -> Result<Option<Bundle>> {
        let key = self.key_for(table)?;
        let what = format!("load {}", key);
        let raw = self
            .retry
            .run(&what, move || {
                let store = Arc::clone(&self.store);
                let key = key.clone();
                async move { read_object(store.as_ref(), &key).await }
            })
            .await?;

        match raw {
            Some(bytes) => Ok(Some(decode_bundle(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load a bundle; a missing object yields the canonical empty bundle.
    pub async fn load(&self, table: &TableName) -> Result<Bundle> {
        Ok(self.load_existing(table).await?.unwrap_or_else(Bundle::empty))
    }

    /// Encode, compress and fully overwrite `table`'s bundle.
    pub async fn store(&self, table: &TableName, bundle: &Bundle) -> Result<()> {
        let key = self.key_for(table)?;
        let data = Bytes::from(encode_bundle(bundle)?);
        let encoding = self.content_encoding.then_some(CONTENT_ENCODING);
        let what = format!("store {}", key);
        self.retry
            .run(&what, move || {
                let store = Arc::clone(&self.store);
                let key = key.clone();
                let data = data.clone();
                async move { write_object(store.as_ref(), &key, data, encoding).await }
            })
            .await?;
        log::debug!(
            "Stored bundle {} (rows={}, row_count={})",
            table,
            bundle.table.len(),
            bundle.register.row_count
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundledb_commons::RowId;
    use object_store::local::LocalFileSystem;
    use object_store::memory::InMemory;
    use serde_json::json;

    fn memory_store() -> BundleStore {
        BundleStore::new(Arc::new(InMemory::new()), "bundle", RetryPolicy::none())
            .with_content_encoding(true)
    }

    fn users_bundle() -> Bundle {
        let table = TableName::new("users");
        let mut bundle = Bundle::empty();
        bundle.register.extend_dataform(&table, ["name"]);
        let id = bundle.register.next_row_id();
        bundle
            .table
            .insert(id, json!({"name": "Ann"}).as_object().cloned().unwrap());
        bundle.index.entry("name".into()).or_default().insert("Ann".into(), vec![id]);
        bundle
    }

    #[tokio::test]
    async fn test_missing_bundle_loads_empty() {
        let store = memory_store();
        let table = TableName::new("ghost");
        assert!(store.load_existing(&table).await.unwrap().is_none());
        assert_eq!(store.load(&table).await.unwrap(), Bundle::empty());
    }

    #[tokio::test]
    async fn test_store_then_load_round_trips() {
        let store = memory_store();
        let table = TableName::new("users");
        let bundle = users_bundle();
        store.store(&table, &bundle).await.unwrap();
        assert_eq!(store.load(&table).await.unwrap(), bundle);
        assert_eq!(store.key_for(&table).unwrap().to_string(), "users.bundle");
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let store = memory_store();
        let table = TableName::new("users");
        let mut bundle = users_bundle();
        store.store(&table, &bundle).await.unwrap();
        bundle.flush();
        store.store(&table, &bundle).await.unwrap();
        let loaded = store.load(&table).await.unwrap();
        assert!(loaded.table.get(&RowId::new(1)).is_none());
        assert_eq!(loaded.register.dataform, bundle.register.dataform);
    }

    #[tokio::test]
    async fn test_local_filesystem_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFileSystem::new_with_prefix(dir.path()).unwrap();
        let store = BundleStore::new(Arc::new(fs), "blob", RetryPolicy::none());
        let table = TableName::new("users");
        store.store(&table, &users_bundle()).await.unwrap();
        assert!(dir.path().join("users.blob").exists());
        assert_eq!(store.load(&table).await.unwrap(), users_bundle());
    }
}
