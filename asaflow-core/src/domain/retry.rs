//! Retry policy for rate-limited remote lookups

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// How a rate-limited call is retried
///
/// `backoff_ms[i]` is the pause before attempt `i + 2`; the last entry is
/// reused when there are more attempts than entries. After a retried call
/// finally succeeds the caller pauses `settle_delay_ms` before moving on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_ms: Vec<u64>,
    pub settle_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_ms: vec![500],
            settle_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: Vec::new(),
            settle_delay_ms: 0,
        }
    }

    fn backoff(&self, retry: usize) -> Duration {
        let ms = self
            .backoff_ms
            .get(retry)
            .or_else(|| self.backoff_ms.last())
            .copied()
            .unwrap_or(0);
        Duration::from_millis(ms)
    }

    /// Run `op`, retrying while `should_retry` accepts the error and attempts remain
    pub fn run<T, F, P>(&self, label: &str, mut op: F, should_retry: P) -> Result<T>
    where
        F: FnMut() -> Result<T>,
        P: Fn(&Error) -> bool,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op() {
                Ok(value) => {
                    if attempt > 1 && self.settle_delay_ms > 0 {
                        thread::sleep(Duration::from_millis(self.settle_delay_ms));
                    }
                    return Ok(value);
                }
                Err(e) if attempt < attempts && should_retry(&e) => {
                    let delay = self.backoff((attempt - 1) as usize);
                    tracing::warn!(
                        "{} failed, retrying in {}ms (attempt {}/{}): {}",
                        label,
                        delay.as_millis(),
                        attempt,
                        attempts,
                        e
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
