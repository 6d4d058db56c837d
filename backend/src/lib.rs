//! BundleDB Server Library
//!
//! Shared by the `bundledb-server` and `bundledb-worker` binaries and exposed
//! for integration testing.

pub mod lifecycle;
pub mod logging;
pub mod middleware;
