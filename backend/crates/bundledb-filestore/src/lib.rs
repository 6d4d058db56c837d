//! # bundledb-filestore
//!
//! Object store access for BundleDB.
//!
//! - **Factory**: builds an `Arc<dyn ObjectStore>` for the configured backend
//!   (local filesystem, in-memory, or S3 with server-side encryption)
//! - **Ops**: thin read/write/list/delete helpers where a missing key is `None`
//! - **Bundle codec**: gzip-compressed JSON `[register, table, index]`
//! - **BundleStore**: `load`/`store` of one bundle per table, with bounded retry
//!
//! ```rust,ignore
//! use bundledb_filestore::{build_object_store, BundleStore, RetryPolicy};
//!
//! let store = build_object_store(&config.storage)?;
//! let bundles = BundleStore::new(store, "bundle", RetryPolicy::from(&config.retry));
//! let bundle = bundles.load(&TableName::new("users")).await?;
//! ```

pub mod bundle_codec;
pub mod bundle_store;
pub mod error;
pub mod object_store_factory;
pub mod object_store_ops;
pub mod retry;

pub use bundle_codec::{decode_bundle, encode_bundle, is_gzip};
pub use bundle_store::BundleStore;
pub use error::{FilestoreError, Result};
pub use object_store_factory::{build_object_store, is_remote_backend};
pub use retry::RetryPolicy;
