//! Yield between persistence batches so retrieval-path writers are not
//! starved of the write connection.

use std::time::Duration;

use somnus_core::config::ConsolidationConfig;

#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// How long to yield between batches.
    pub yield_duration: Duration,
    /// Writes per batch before yielding.
    pub batch_size: usize,
}

impl From<&ConsolidationConfig> for ThrottleConfig {
    fn from(config: &ConsolidationConfig) -> Self {
        Self {
            yield_duration: Duration::from_millis(config.throttle_yield_ms),
            batch_size: config.throttle_batch_size.max(1),
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self::from(&ConsolidationConfig::default())
    }
}

/// Counts writes and says when to yield.
#[derive(Debug)]
pub struct Throttle {
    config: ThrottleConfig,
    items_in_batch: usize,
}

impl Throttle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            items_in_batch: 0,
        }
    }

    /// Record a write. Returns true if the caller should yield.
    pub fn tick(&mut self) -> bool {
        self.items_in_batch += 1;
        if self.items_in_batch >= self.config.batch_size {
            self.items_in_batch = 0;
            true
        } else {
            false
        }
    }

    /// Record a write and sleep at batch boundaries.
    pub fn tick_and_yield(&mut self) {
        if self.tick() && !self.config.yield_duration.is_zero() {
            std::thread::sleep(self.config.yield_duration);
        }
    }
}
