//! Shared error types for BundleDB.
//!
//! ```rust
//! use bundledb_commons::errors::{CommonError, Result};
//!
//! fn require_fields(fields: &[String]) -> Result<()> {
//!     if fields.is_empty() {
//!         return Err(CommonError::InvalidInput("fields cannot be empty".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result alias for commons operations.
pub type Result<T> = std::result::Result<T, CommonError>;

/// Common error type shared across crates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommonError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CommonError {
    fn from(e: serde_json::Error) -> Self {
        CommonError::Serialization(e.to_string())
    }
}
