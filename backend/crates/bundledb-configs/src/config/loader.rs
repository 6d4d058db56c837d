use super::types::{ServerConfig, StorageBackend, UpdateResolution};
use crate::file_helpers::normalize_dir_path;
use std::env;
use std::fs;
use std::path::Path;

const VALID_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl ServerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment overrides are applied separately via `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let mut config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.finalize()?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults, then apply
    /// environment overrides and finalize.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.finalize()?;
        Ok(config)
    }

    /// Apply `BUNDLEDB_*` environment overrides.
    ///
    /// Supported variables:
    /// - BUNDLEDB_SERVER_HOST, BUNDLEDB_SERVER_PORT
    /// - BUNDLEDB_ROUTE_PREFIX
    /// - BUNDLEDB_STORAGE_BACKEND (local | memory | s3)
    /// - BUNDLEDB_DATA_DIR
    /// - BUNDLEDB_S3_BUCKET, BUNDLEDB_S3_REGION, BUNDLEDB_S3_ENDPOINT
    /// - BUNDLEDB_BUNDLE_SUFFIX
    /// - BUNDLEDB_WORKER_EMBEDDED
    /// - BUNDLEDB_UPDATE_RESOLUTION (snapshot | fresh)
    /// - BUNDLEDB_LOG_LEVEL, BUNDLEDB_LOGS_DIR, BUNDLEDB_LOG_TO_CONSOLE
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(host) = env::var("BUNDLEDB_SERVER_HOST") {
            self.server.host = host;
        }

        if let Ok(port_str) = env::var("BUNDLEDB_SERVER_PORT") {
            self.server.port = port_str
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid BUNDLEDB_SERVER_PORT value: {}", port_str))?;
        }

        if let Ok(prefix) = env::var("BUNDLEDB_ROUTE_PREFIX") {
            self.server.route_prefix = prefix;
        }

        if let Ok(backend) = env::var("BUNDLEDB_STORAGE_BACKEND") {
            self.storage.backend = match backend.to_lowercase().as_str() {
                "local" => StorageBackend::Local,
                "memory" => StorageBackend::Memory,
                "s3" => StorageBackend::S3,
                other => {
                    return Err(anyhow::anyhow!("Invalid BUNDLEDB_STORAGE_BACKEND value: {}", other))
                },
            };
        }

        if let Ok(path) = env::var("BUNDLEDB_DATA_DIR") {
            self.storage.data_path = path;
        }
        if let Ok(bucket) = env::var("BUNDLEDB_S3_BUCKET") {
            self.storage.bucket = Some(bucket);
        }
        if let Ok(region) = env::var("BUNDLEDB_S3_REGION") {
            self.storage.region = Some(region);
        }
        if let Ok(endpoint) = env::var("BUNDLEDB_S3_ENDPOINT") {
            self.storage.endpoint = Some(endpoint);
        }
        if let Ok(suffix) = env::var("BUNDLEDB_BUNDLE_SUFFIX") {
            self.storage.bundle_suffix = suffix;
        }

        if let Ok(val) = env::var("BUNDLEDB_WORKER_EMBEDDED") {
            self.worker.embedded = parse_bool(&val);
        }
        if let Ok(val) = env::var("BUNDLEDB_UPDATE_RESOLUTION") {
            self.worker.update_resolution = match val.to_lowercase().as_str() {
                "snapshot" => UpdateResolution::Snapshot,
                "fresh" => UpdateResolution::Fresh,
                other => {
                    return Err(anyhow::anyhow!("Invalid BUNDLEDB_UPDATE_RESOLUTION value: {}", other))
                },
            };
        }

        if let Ok(level) = env::var("BUNDLEDB_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if let Ok(path) = env::var("BUNDLEDB_LOGS_DIR") {
            self.logging.logs_path = path;
        }
        if let Ok(val) = env::var("BUNDLEDB_LOG_TO_CONSOLE") {
            self.logging.log_to_console = parse_bool(&val);
        }

        Ok(())
    }

    fn normalize(&mut self) {
        self.storage.data_path = normalize_dir_path(&self.storage.data_path);
        self.logging.logs_path = normalize_dir_path(&self.logging.logs_path);

        let prefix = self.server.route_prefix.trim().trim_end_matches('/');
        self.server.route_prefix = if prefix.is_empty() || prefix.starts_with('/') {
            prefix.to_string()
        } else {
            format!("/{}", prefix)
        };

        self.storage.bundle_suffix =
            self.storage.bundle_suffix.trim().trim_start_matches('.').to_string();
        self.queue.prefix = self.queue.prefix.trim().trim_matches('/').to_string();
    }

    /// Normalize paths and prefixes, then validate.
    ///
    /// Call this after applying environment overrides.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.normalize();
        self.validate()?;
        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.server.max_body_bytes == 0 {
            return Err(anyhow::anyhow!("max_body_bytes cannot be 0"));
        }

        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                VALID_LEVELS.join(", ")
            ));
        }

        let valid_formats = ["compact", "pretty", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_formats.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    VALID_LEVELS.join(", ")
                ));
            }
        }

        if self.storage.bundle_suffix.is_empty() || self.storage.bundle_suffix.contains('/') {
            return Err(anyhow::anyhow!(
                "Invalid bundle_suffix '{}'",
                self.storage.bundle_suffix
            ));
        }

        if self.storage.backend == StorageBackend::S3
            && self.storage.bucket.as_deref().map_or(true, |b| b.trim().is_empty())
        {
            return Err(anyhow::anyhow!("storage.bucket is required for the s3 backend"));
        }

        if self.queue.prefix.is_empty() {
            return Err(anyhow::anyhow!("queue.prefix cannot be empty"));
        }

        if self.queue.attempts == 0 {
            return Err(anyhow::anyhow!("queue.attempts cannot be 0"));
        }

        if self.retry.max_attempts == 0 {
            return Err(anyhow::anyhow!("retry.max_attempts cannot be 0"));
        }

        if self.worker.poll_interval_ms == 0 {
            return Err(anyhow::anyhow!("worker.poll_interval_ms cannot be 0"));
        }

        Ok(())
    }
}

fn parse_bool(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.route_prefix, "/ods");
        assert_eq!(config.queue.attempts, 5);
        assert_eq!(config.worker.update_resolution, UpdateResolution::Snapshot);
    }

    #[test]
    fn test_invalid_port() {
        let mut config = ServerConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = ServerConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.logging.targets.insert("object_store".into(), "loud".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_requires_bucket() {
        let mut config = ServerConfig::default();
        config.storage.backend = StorageBackend::S3;
        assert!(config.validate().is_err());
        config.storage.bucket = Some("bundles".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_with_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000
route_prefix = "api/"

[storage]
backend = "memory"
bundle_suffix = ".blob"

[worker]
embedded = true
update_resolution = "fresh"
"#
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.route_prefix, "/api");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.bundle_suffix, "blob");
        assert!(config.worker.embedded);
        assert_eq!(config.worker.update_resolution, UpdateResolution::Fresh);
        assert_eq!(config.retry.max_attempts, 10);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        assert!(ServerConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.storage.bundle_suffix, "bundle");
    }
}
