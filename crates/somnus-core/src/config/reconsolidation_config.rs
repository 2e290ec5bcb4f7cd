use serde::{Deserialize, Serialize};

use super::defaults;

/// Reconsolidation window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconsolidationConfig {
    /// How long a memory stays labile after retrieval.
    pub window_minutes: u64,
}

impl Default for ReconsolidationConfig {
    fn default() -> Self {
        Self {
            window_minutes: defaults::DEFAULT_RECONSOLIDATION_WINDOW_MINUTES,
        }
    }
}
