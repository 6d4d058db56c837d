use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration, shared by `bundledb-server` and `bundledb-worker`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub queue: QueueSettings,
    #[serde(default)]
    pub worker: WorkerSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of actix workers (0 = one per CPU core)
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Path prefix every API route is mounted under (default: "/ods")
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
    /// Maximum accepted JSON body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default)]
    pub cors: CorsSettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            route_prefix: default_route_prefix(),
            max_body_bytes: default_max_body_bytes(),
            cors: CorsSettings::default(),
        }
    }
}

/// CORS options mapped onto actix-cors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins. Empty = any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Preflight cache max age in seconds
    #[serde(default = "default_cors_max_age")]
    pub max_age: usize,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

/// Which object store backs bundles and the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Local filesystem rooted at `storage.data_path`
    #[default]
    Local,
    /// Process-local in-memory store (tests, embedded worker only)
    Memory,
    /// Amazon S3 or an S3-compatible endpoint
    S3,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Local => "local",
            StorageBackend::Memory => "memory",
            StorageBackend::S3 => "s3",
        }
    }
}

/// Object store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the local backend (default: "./data")
    #[serde(default = "default_data_path")]
    pub data_path: String,
    /// Bucket name for the s3 backend
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Credentials; when absent the AWS_* environment is used
    #[serde(default, skip_serializing)]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub secret_access_key: Option<String>,
    /// Request server-side AES256 encryption on S3 writes
    #[serde(default = "default_true")]
    pub server_side_encryption: bool,
    /// Object key suffix (`<tablename>.<suffix>`)
    #[serde(default = "default_bundle_suffix")]
    pub bundle_suffix: String,
    /// Remote request timeout in seconds
    #[serde(default = "default_storage_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_path: default_data_path(),
            bucket: None,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            server_side_encryption: true,
            bundle_suffix: default_bundle_suffix(),
            timeout_secs: default_storage_timeout_secs(),
        }
    }
}

/// Job queue settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Key prefix under which jobs are stored
    #[serde(default = "default_queue_prefix")]
    pub prefix: String,
    /// Attempts granted to each enqueued job
    #[serde(default = "default_enqueue_attempts")]
    pub attempts: u32,
    #[serde(default = "default_queue_priority")]
    pub priority: String,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            prefix: default_queue_prefix(),
            attempts: default_enqueue_attempts(),
            priority: default_queue_priority(),
        }
    }
}

/// How the worker resolves the target rows of an update job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateResolution {
    /// Apply to the bundle snapshot carried inside the job.
    #[default]
    Snapshot,
    /// Reload the bundle and re-match the job's constraints before applying.
    Fresh,
}

/// Serializing worker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Run the worker loop inside the server process
    #[serde(default)]
    pub embedded: bool,
    /// Sleep between polls of an empty queue
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub update_resolution: UpdateResolution,
    /// Purge leftover completed-job keys before the first cycle
    #[serde(default = "default_true")]
    pub sweep_on_start: bool,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            embedded: false,
            poll_interval_ms: default_poll_interval_ms(),
            update_resolution: UpdateResolution::default(),
            sweep_on_start: true,
        }
    }
}

/// Bounded retry for object store and queue calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
    /// Upper bound of the random extra delay added to each wait
    #[serde(default = "default_retry_jitter_ms")]
    pub jitter_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            delay_ms: default_retry_delay_ms(),
            jitter_ms: default_retry_jitter_ms(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for log files (default: "./logs")
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional per-target overrides, e.g. `[logging.targets] object_store = "warn"`
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_path: default_logs_path(),
            log_to_console: true,
            format: default_log_format(),
            targets: HashMap::new(),
        }
    }
}
