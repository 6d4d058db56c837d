use bundledb_commons::constants::DEFAULT_BUNDLE_SUFFIX;

// Server
pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    8080
}

pub fn default_workers() -> usize {
    0 // 0 = one per CPU core
}

pub fn default_route_prefix() -> String {
    "/ods".to_string()
}

pub fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024 // 16MB, bundles travel inside snapshot update jobs
}

pub fn default_true() -> bool {
    true
}

pub fn default_cors_max_age() -> usize {
    3600
}

// Storage
pub fn default_data_path() -> String {
    "./data".to_string()
}

pub fn default_bundle_suffix() -> String {
    DEFAULT_BUNDLE_SUFFIX.to_string()
}

pub fn default_storage_timeout_secs() -> u64 {
    30
}

// Queue
pub fn default_queue_prefix() -> String {
    "queue".to_string()
}

pub fn default_enqueue_attempts() -> u32 {
    5
}

pub fn default_queue_priority() -> String {
    "high".to_string()
}

// Worker
pub fn default_poll_interval_ms() -> u64 {
    250
}

// Retry
pub fn default_retry_max_attempts() -> u32 {
    10
}

pub fn default_retry_delay_ms() -> u64 {
    50
}

pub fn default_retry_jitter_ms() -> u64 {
    25
}

// Logging
pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_logs_path() -> String {
    "./logs".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

/// Effective HTTP worker count for `configured` (0 = CPU count).
pub fn effective_workers(configured: usize) -> usize {
    if configured == 0 {
        num_cpus::get().max(1)
    } else {
        configured
    }
}
