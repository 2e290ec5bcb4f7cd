//! # somnus-providers
//!
//! Network collaborators: an Ollama embedding provider and an Ollama
//! reasoning client, plus factories that pick an implementation from config.

pub mod ollama_embedding;
pub mod ollama_reasoner;

pub use ollama_embedding::OllamaEmbeddingProvider;
pub use ollama_reasoner::OllamaReasoner;

use somnus_core::config::ProvidersConfig;
use somnus_core::traits::{IEmbeddingProvider, IReasoner, NoOpReasoner};
use tracing::{info, warn};

/// Build the embedding provider. A failed health check still returns the
/// provider, reporting itself unavailable, so clustering degrades to session
/// and timestamp grouping instead of aborting. Every run probes it again.
pub fn create_embedding_provider(config: &ProvidersConfig) -> Box<dyn IEmbeddingProvider> {
    let provider = OllamaEmbeddingProvider::new(
        config.embedding_model.clone(),
        config.embedding_dimensions,
        config.ollama_url.clone(),
    );
    if provider.health_check() {
        info!(provider = "ollama", model = %config.embedding_model, "embedding provider connected");
    } else {
        warn!(
            provider = "ollama",
            url = %config.ollama_url,
            "embedding provider unavailable, similarity signals disabled"
        );
    }
    Box::new(provider)
}

/// Build the reasoner named by `config.reasoner`: `"ollama"` or `"none"`.
pub fn create_reasoner(config: &ProvidersConfig) -> Box<dyn IReasoner> {
    match config.reasoner.as_str() {
        "ollama" => {
            let reasoner =
                OllamaReasoner::new(config.reasoning_model.clone(), config.ollama_url.clone());
            if reasoner.health_check() {
                info!(reasoner = "ollama", model = %config.reasoning_model, "reasoner connected");
            } else {
                warn!(reasoner = "ollama", "reasoner unavailable, slow path will degrade");
            }
            Box::new(reasoner)
        }
        "none" => {
            info!(reasoner = "noop", "heuristic-only operation");
            Box::new(NoOpReasoner)
        }
        other => {
            warn!(reasoner = other, "unknown reasoner, using heuristic-only operation");
            Box::new(NoOpReasoner)
        }
    }
}

/// Check `GET {base_url}/api/tags` within five seconds.
pub(crate) fn ollama_reachable(base_url: &str) -> bool {
    let url = format!("{base_url}/api/tags");
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(_) => return false,
    };
    let result = rt.block_on(async {
        reqwest::Client::new()
            .get(&url)
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await
    });
    match result {
        Ok(resp) if resp.status().is_success() => true,
        Ok(resp) => {
            warn!(status = %resp.status(), "Ollama health check failed");
            false
        }
        Err(e) => {
            warn!(error = %e, "Ollama unreachable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable() -> ProvidersConfig {
        ProvidersConfig {
            ollama_url: "http://127.0.0.1:9".to_string(),
            ..ProvidersConfig::default()
        }
    }

    #[test]
    fn none_selects_noop_reasoner() {
        let config = ProvidersConfig {
            reasoner: "none".to_string(),
            ..unreachable()
        };
        let reasoner = create_reasoner(&config);
        assert_eq!(reasoner.name(), "noop");
        assert!(!reasoner.is_available());
    }

    #[test]
    fn unreachable_embedding_service_reports_unavailable() {
        let provider = create_embedding_provider(&unreachable());
        assert!(!provider.is_available());
        assert!(provider.embed("anything").is_err());
    }
}
