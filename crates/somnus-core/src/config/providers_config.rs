use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding and reasoning service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub ollama_url: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub reasoning_model: String,
    /// "ollama" or "none".
    pub reasoner: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            ollama_url: defaults::DEFAULT_OLLAMA_URL.to_string(),
            embedding_model: defaults::DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            reasoning_model: defaults::DEFAULT_REASONING_MODEL.to_string(),
            reasoner: defaults::DEFAULT_REASONER.to_string(),
        }
    }
}
