//! Path helpers for directory-like configuration values.

use std::path::{Path, PathBuf};

/// Resolve `path` against the current working directory.
///
/// Relative paths stay relative in meaning; the result is simply absolute so
/// that log lines and object-store roots are unambiguous.
pub fn normalize_dir_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let candidate = Path::new(trimmed);
    if candidate.is_absolute() {
        let stripped = trimmed.trim_end_matches('/');
        return if stripped.is_empty() { "/".to_string() } else { stripped.to_string() };
    }
    match std::env::current_dir() {
        Ok(cwd) => join_path(cwd, trimmed.trim_start_matches("./"))
            .to_string_lossy()
            .trim_end_matches('/')
            .to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Join a child segment onto a base directory.
pub fn join_path(base: impl AsRef<Path>, child: &str) -> PathBuf {
    base.as_ref().join(child)
}
