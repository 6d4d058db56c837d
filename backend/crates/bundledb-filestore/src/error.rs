use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilestoreError>;

#[derive(Debug, Error)]
pub enum FilestoreError {
    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("Invalid object path: {0}")]
    Path(String),

    #[error("Object store error: {0}")]
    ObjectStore(String),

    #[error("Bundle codec error: {0}")]
    Codec(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("{0}")]
    Other(String),
}

impl From<object_store::Error> for FilestoreError {
    fn from(e: object_store::Error) -> Self {
        FilestoreError::ObjectStore(e.to_string())
    }
}

impl From<object_store::path::Error> for FilestoreError {
    fn from(e: object_store::path::Error) -> Self {
        FilestoreError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for FilestoreError {
    fn from(e: serde_json::Error) -> Self {
        FilestoreError::Codec(e.to_string())
    }
}
