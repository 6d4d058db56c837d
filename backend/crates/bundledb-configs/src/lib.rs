//! bundledb-configs
//!
//! Configuration types and loader shared by the server and the worker binaries.

pub mod config;
pub mod file_helpers;

pub use config::defaults;
pub use config::*;
