//! Engine configuration, loaded from TOML with compiled defaults.

pub mod defaults;

mod consolidation_config;
mod contradiction_config;
mod observability_config;
mod providers_config;
mod reconsolidation_config;
mod slow_path_config;
mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use consolidation_config::ConsolidationConfig;
pub use contradiction_config::ContradictionConfig;
pub use observability_config::ObservabilityConfig;
pub use providers_config::ProvidersConfig;
pub use reconsolidation_config::ReconsolidationConfig;
pub use slow_path_config::SlowPathConfig;
pub use storage_config::StorageConfig;

use crate::errors::{ConfigError, SomnusResult};

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`SOMNUS_*`)
/// 2. TOML file or string
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SomnusConfig {
    pub consolidation: ConsolidationConfig,
    pub slow_path: SlowPathConfig,
    pub reconsolidation: ReconsolidationConfig,
    pub contradiction: ContradictionConfig,
    pub storage: StorageConfig,
    pub providers: ProvidersConfig,
    pub observability: ObservabilityConfig,
}

impl SomnusConfig {
    /// Parse a TOML string. Missing sections and keys take their defaults.
    pub fn from_toml(toml_str: &str) -> SomnusResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file, then apply `SOMNUS_*` environment overrides.
    pub fn from_file(path: &Path) -> SomnusResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            reason: format!("{}: {e}", path.display()),
        })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `SOMNUS_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SOMNUS_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Ok(v) = std::env::var("SOMNUS_OLLAMA_URL") {
            self.providers.ollama_url = v;
        }
        if let Ok(v) = std::env::var("SOMNUS_REASONER") {
            self.providers.reasoner = v;
        }
        if let Ok(v) = std::env::var("SOMNUS_LOG_LEVEL") {
            self.observability.log_level = v;
        }
        if let Some(v) = env_parse::<usize>("SOMNUS_SLOW_PATH_CONCURRENCY") {
            self.slow_path.concurrency = v;
        }
        if let Some(v) = env_parse::<u64>("SOMNUS_SLOW_PATH_TIMEOUT_SECONDS") {
            self.slow_path.timeout_seconds = v;
        }
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_fields = [
            (
                "consolidation.similarity_threshold",
                self.consolidation.similarity_threshold,
            ),
            (
                "consolidation.min_pattern_confidence",
                self.consolidation.min_pattern_confidence,
            ),
            (
                "consolidation.discard_confidence_floor",
                self.consolidation.discard_confidence_floor,
            ),
            (
                "consolidation.merge_similarity_threshold",
                self.consolidation.merge_similarity_threshold,
            ),
            (
                "contradiction.topical_similarity_threshold",
                self.contradiction.topical_similarity_threshold,
            ),
            (
                "contradiction.auto_resolve_severity",
                self.contradiction.auto_resolve_severity,
            ),
            (
                "contradiction.review_severity",
                self.contradiction.review_severity,
            ),
        ];
        for (key, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(key, "must be between 0.0 and 1.0"));
            }
        }

        let c = &self.consolidation;
        if c.discard_confidence_floor > c.min_pattern_confidence {
            return Err(invalid(
                "consolidation.discard_confidence_floor",
                "must not exceed min_pattern_confidence",
            ));
        }
        let weight_sum = c.cohesion_weight + c.frequency_weight + c.evidence_weight;
        if [c.cohesion_weight, c.frequency_weight, c.evidence_weight]
            .iter()
            .any(|w| *w < 0.0)
            || (weight_sum - 1.0).abs() > 1e-6
        {
            return Err(invalid(
                "consolidation.*_weight",
                "weights must be non-negative and sum to 1.0",
            ));
        }
        if c.frequency_saturation == 0 {
            return Err(invalid("consolidation.frequency_saturation", "must be > 0"));
        }
        if self.contradiction.review_severity > self.contradiction.auto_resolve_severity {
            return Err(invalid(
                "contradiction.review_severity",
                "must not exceed auto_resolve_severity",
            ));
        }
        if self.slow_path.concurrency == 0 {
            return Err(invalid("slow_path.concurrency", "must be > 0"));
        }
        if self.slow_path.timeout_seconds == 0 {
            return Err(invalid("slow_path.timeout_seconds", "must be > 0"));
        }
        if self.slow_path.min_support == 0 {
            return Err(invalid("slow_path.min_support", "must be > 0"));
        }
        if !matches!(self.providers.reasoner.as_str(), "ollama" | "none") {
            return Err(invalid("providers.reasoner", "expected \"ollama\" or \"none\""));
        }
        Ok(())
    }
}

impl ConsolidationConfig {
    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(self.time_window_hours as i64)
    }

    pub fn proximity(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.proximity_threshold_minutes as i64)
    }
}

impl SlowPathConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }
}

impl ReconsolidationConfig {
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.window_minutes as i64)
    }
}

impl ContradictionConfig {
    pub fn recency_horizon(&self) -> chrono::Duration {
        chrono::Duration::days(self.recency_horizon_days as i64)
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
