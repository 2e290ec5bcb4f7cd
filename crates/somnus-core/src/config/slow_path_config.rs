use serde::{Deserialize, Serialize};

use super::defaults;

/// System-2 (reasoner) call policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlowPathConfig {
    /// Maximum concurrent extraction workers.
    pub concurrency: usize,
    /// Hard timeout per reasoner call.
    pub timeout_seconds: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// First backoff delay; doubled on each retry.
    pub backoff_ms: u64,
    /// Minimum cluster support for escalation.
    pub min_support: usize,
}

impl Default for SlowPathConfig {
    fn default() -> Self {
        Self {
            concurrency: defaults::DEFAULT_SLOW_PATH_CONCURRENCY,
            timeout_seconds: defaults::DEFAULT_SLOW_PATH_TIMEOUT_SECONDS,
            max_retries: defaults::DEFAULT_SLOW_PATH_MAX_RETRIES,
            backoff_ms: defaults::DEFAULT_SLOW_PATH_BACKOFF_MS,
            min_support: defaults::DEFAULT_SLOW_PATH_MIN_SUPPORT,
        }
    }
}
