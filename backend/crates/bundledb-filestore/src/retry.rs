//! Bounded retry for object store and queue calls.

use crate::error::{FilestoreError, Result};
use bundledb_configs::RetrySettings;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Fixed-delay retry with optional random jitter.
///
/// Exhausting `max_attempts` is an error; callers decide how to degrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            delay: Duration::from_millis(settings.delay_ms),
            jitter: Duration::from_millis(settings.jitter_ms),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    fn backoff(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        let extra = rand::rng().random_range(0..=self.jitter.as_millis() as u64);
        self.delay + Duration::from_millis(extra)
    }

    /// Run `op` until it succeeds or the attempts run out.
    ///
    /// `what` names the operation in log lines.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !is_transient(&e) => return Err(e),
                Err(e) if attempt >= self.max_attempts => {
                    log::error!("{} failed after {} attempts: {}", what, attempt, e);
                    return Err(FilestoreError::RetriesExhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                },
                Err(e) => {
                    log::warn!("{} attempt {}/{} failed: {}", what, attempt, self.max_attempts, e);
                    let wait = self.backoff();
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                },
            }
        }
    }
}

/// Codec and configuration errors never heal by retrying.
fn is_transient(e: &FilestoreError) -> bool {
    matches!(
        e,
        FilestoreError::ObjectStore(_) | FilestoreError::Io(_) | FilestoreError::Other(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::from_millis(1),
            jitter: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = fast(5)
            .run("flaky", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(FilestoreError::ObjectStore("503".into()))
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_is_an_error() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = fast(3)
            .run("down", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FilestoreError::ObjectStore("timeout".into()))
            })
            .await;
        assert!(matches!(result, Err(FilestoreError::RetriesExhausted { attempts: 3, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_codec_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = fast(5)
            .run("decode", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FilestoreError::Codec("bad".into()))
            })
            .await;
        assert!(matches!(result, Err(FilestoreError::Codec(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_attempt_keeps_codec_error() {
        let result: Result<()> = RetryPolicy::none()
            .run("decode", || async { Err(FilestoreError::Codec("bad".into())) })
            .await;
        assert!(matches!(result, Err(FilestoreError::Codec(_))));

        let result: Result<()> = fast(2)
            .run("decode", || async { Err(FilestoreError::Path("x".into())) })
            .await;
        assert!(matches!(result, Err(FilestoreError::Path(_))));
    }

    #[test]
    fn test_from_settings_clamps_attempts() {
        let policy = RetryPolicy::from(&RetrySettings {
            max_attempts: 0,
            delay_ms: 5,
            jitter_ms: 0,
        });
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay, Duration::from_millis(5));
    }
}
