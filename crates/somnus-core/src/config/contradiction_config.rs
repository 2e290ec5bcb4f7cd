use serde::{Deserialize, Serialize};

use super::defaults;

/// Contradiction detection and resolution policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContradictionConfig {
    /// Embedding similarity for two memories to be about the same topic.
    pub topical_similarity_threshold: f64,
    /// Severity above which the detector resolves automatically.
    pub auto_resolve_severity: f64,
    /// Severity from which a contradiction is queued for review.
    pub review_severity: f64,
    /// Creation-time gap at which recency skew reaches zero.
    pub recency_horizon_days: u64,
}

impl Default for ContradictionConfig {
    fn default() -> Self {
        Self {
            topical_similarity_threshold: defaults::DEFAULT_TOPICAL_SIMILARITY_THRESHOLD,
            auto_resolve_severity: defaults::DEFAULT_AUTO_RESOLVE_SEVERITY,
            review_severity: defaults::DEFAULT_REVIEW_SEVERITY,
            recency_horizon_days: defaults::DEFAULT_RECENCY_HORIZON_DAYS,
        }
    }
}
