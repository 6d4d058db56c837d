// Error types module
use bundledb_commons::{CommonError, TableNameValidationError};
use bundledb_filestore::FilestoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BundleDbError>;

/// Main error type for BundleDB
#[derive(Error, Debug)]
pub enum BundleDbError {
    #[error("Storage error: {0}")]
    Storage(#[from] FilestoreError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Invalid table name: {0}")]
    InvalidTable(#[from] TableNameValidationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Job error: {0}")]
    Job(String),

    #[error("{0}")]
    Other(String),
}

impl From<CommonError> for BundleDbError {
    fn from(e: CommonError) -> Self {
        match e {
            CommonError::Serialization(msg) => BundleDbError::Serialization(msg),
            other => BundleDbError::InvalidInput(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for BundleDbError {
    fn from(e: serde_json::Error) -> Self {
        BundleDbError::Serialization(e.to_string())
    }
}

/// Job queue errors
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Queue storage error: {0}")]
    Storage(#[from] FilestoreError),

    #[error("Malformed job {key}: {reason}")]
    Malformed { key: String, reason: String },

    #[error("Queue serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for QueueError {
    fn from(e: serde_json::Error) -> Self {
        QueueError::Serialization(e.to_string())
    }
}
