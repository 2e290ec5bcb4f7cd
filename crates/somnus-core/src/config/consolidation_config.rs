use serde::{Deserialize, Serialize};

use super::defaults;

/// Clustering and pattern-extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Lookback window for unconsolidated events.
    pub time_window_hours: u64,
    /// Maximum timestamp gap for two events to share a cluster.
    pub proximity_threshold_minutes: u64,
    /// Cosine similarity at which two events share a cluster.
    pub similarity_threshold: f64,
    /// System-1 confidence below which a cluster escalates.
    pub min_pattern_confidence: f64,
    /// Confidence below which a cluster's patterns are discarded.
    pub discard_confidence_floor: f64,
    /// Similarity at which a new pattern revises an existing memory instead
    /// of creating one.
    pub merge_similarity_threshold: f64,
    /// Support at which the frequency signal saturates.
    pub frequency_saturation: usize,
    /// System-1 confidence weights.
    pub cohesion_weight: f64,
    pub frequency_weight: f64,
    pub evidence_weight: f64,
    /// Writes between persistence yields.
    pub throttle_batch_size: usize,
    pub throttle_yield_ms: u64,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            time_window_hours: defaults::DEFAULT_TIME_WINDOW_HOURS,
            proximity_threshold_minutes: defaults::DEFAULT_PROXIMITY_THRESHOLD_MINUTES,
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            min_pattern_confidence: defaults::DEFAULT_MIN_PATTERN_CONFIDENCE,
            discard_confidence_floor: defaults::DEFAULT_DISCARD_CONFIDENCE_FLOOR,
            merge_similarity_threshold: defaults::DEFAULT_MERGE_SIMILARITY_THRESHOLD,
            frequency_saturation: defaults::DEFAULT_FREQUENCY_SATURATION,
            cohesion_weight: defaults::DEFAULT_COHESION_WEIGHT,
            frequency_weight: defaults::DEFAULT_FREQUENCY_WEIGHT,
            evidence_weight: defaults::DEFAULT_EVIDENCE_WEIGHT,
            throttle_batch_size: defaults::DEFAULT_THROTTLE_BATCH_SIZE,
            throttle_yield_ms: defaults::DEFAULT_THROTTLE_YIELD_MS,
        }
    }
}
