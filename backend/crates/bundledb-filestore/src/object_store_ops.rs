//! Object store operations used by the bundle store and the job queue.
//!
//! A missing key is not an error here: reads return `None` and deletes succeed.

use crate::error::{FilestoreError, Result};
use bytes::Bytes;
use futures_util::TryStreamExt;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};

/// Parse a `/`-separated key into an object path.
pub fn object_path(key: &str) -> Result<ObjectPath> {
    ObjectPath::parse(key).map_err(|e| FilestoreError::Path(format!("{key}: {e}")))
}

/// Read an object, returning `None` if it does not exist.
pub async fn read_object(store: &dyn ObjectStore, key: &ObjectPath) -> Result<Option<Bytes>> {
    match store.get(key).await {
        Ok(result) => Ok(Some(result.bytes().await?)),
        Err(object_store::Error::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fully overwrite an object.
///
/// When `content_encoding` is set, the value is attached as the object's
/// `Content-Encoding` attribute.
pub async fn write_object(
    store: &dyn ObjectStore,
    key: &ObjectPath,
    data: Bytes,
    content_encoding: Option<&'static str>,
) -> Result<()> {
    let mut attributes = Attributes::new();
    if let Some(encoding) = content_encoding {
        attributes.insert(Attribute::ContentEncoding, encoding.into());
    }
    let options = PutOptions {
        attributes,
        ..Default::default()
    };
    store.put_opts(key, PutPayload::from(data), options).await?;
    Ok(())
}

/// List keys under `prefix`, sorted ascending.
pub async fn list_keys(store: &dyn ObjectStore, prefix: &ObjectPath) -> Result<Vec<ObjectPath>> {
    let mut keys: Vec<ObjectPath> = store
        .list(Some(prefix))
        .map_ok(|meta| meta.location)
        .try_collect()
        .await?;
    keys.sort();
    Ok(keys)
}

/// Delete an object; deleting a missing key succeeds.
pub async fn delete_object(store: &dyn ObjectStore, key: &ObjectPath) -> Result<()> {
    match store.delete(key).await {
        Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    #[tokio::test]
    async fn test_missing_object_reads_as_none() {
        let store = InMemory::new();
        let key = object_path("absent.bundle").unwrap();
        assert!(read_object(&store, &key).await.unwrap().is_none());
        delete_object(&store, &key).await.unwrap();
    }

    #[tokio::test]
    async fn test_write_read_overwrite() {
        let store = InMemory::new();
        let key = object_path("users.bundle").unwrap();
        write_object(&store, &key, Bytes::from_static(b"one"), Some("gzip")).await.unwrap();
        write_object(&store, &key, Bytes::from_static(b"two"), None).await.unwrap();
        let read = read_object(&store, &key).await.unwrap().unwrap();
        assert_eq!(&read[..], b"two");
    }

    #[tokio::test]
    async fn test_list_keys_sorted_under_prefix() {
        let store = InMemory::new();
        for key in ["queue/b", "queue/a", "other/c"] {
            write_object(&store, &object_path(key).unwrap(), Bytes::from_static(b"x"), None)
                .await
                .unwrap();
        }
        let keys = list_keys(&store, &object_path("queue").unwrap()).await.unwrap();
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["queue/a", "queue/b"]);
    }
}
