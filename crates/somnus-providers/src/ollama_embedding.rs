//! Ollama embedding provider (`POST /api/embed`).

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use somnus_core::errors::{CollaboratorError, SomnusResult};
use somnus_core::traits::IEmbeddingProvider;
use tracing::debug;

const COLLABORATOR: &str = "ollama-embedding";

pub struct OllamaEmbeddingProvider {
    base_url: String,
    model: String,
    dimensions: usize,
    available: AtomicBool,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbeddingProvider {
    /// Starts unavailable until
    /// [`health_check`](IEmbeddingProvider::health_check) passes.
    pub fn new(model: String, dimensions: usize, base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            dimensions,
            available: AtomicBool::new(false),
        }
    }

    fn request_embeddings(&self, texts: Vec<String>) -> SomnusResult<Vec<Vec<f32>>> {
        if !self.available.load(Ordering::Relaxed) {
            return Err(unavailable("health check has not passed"));
        }
        let expected = texts.len();
        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| unavailable(&format!("runtime error: {e}")))?;

        let result: SomnusResult<EmbedResponse> = rt.block_on(async {
            let response = reqwest::Client::new()
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| unavailable(&format!("HTTP error: {e}")))?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(unavailable(&format!("returned {status}: {body}")));
            }
            response.json::<EmbedResponse>().await.map_err(|e| {
                CollaboratorError::MalformedResponse {
                    collaborator: COLLABORATOR.to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
        });
        let resp = result?;

        if resp.embeddings.len() != expected {
            return Err(CollaboratorError::MalformedResponse {
                collaborator: COLLABORATOR.to_string(),
                reason: format!("expected {expected} embeddings, got {}", resp.embeddings.len()),
            }
            .into());
        }
        for v in &resp.embeddings {
            if v.len() != self.dimensions {
                return Err(CollaboratorError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: v.len(),
                }
                .into());
            }
        }
        Ok(resp.embeddings)
    }
}

fn unavailable(reason: &str) -> somnus_core::SomnusError {
    CollaboratorError::Unavailable {
        collaborator: COLLABORATOR.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

impl IEmbeddingProvider for OllamaEmbeddingProvider {
    fn embed(&self, text: &str) -> SomnusResult<Vec<f32>> {
        self.request_embeddings(vec![text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| unavailable("empty response"))
    }

    fn embed_batch(&self, texts: &[String]) -> SomnusResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(texts.to_vec())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    fn health_check(&self) -> bool {
        let ok = crate::ollama_reachable(&self.base_url);
        self.available.store(ok, Ordering::Relaxed);
        if ok {
            debug!(model = %self.model, "Ollama embedding health check passed");
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_shape_parses() {
        let resp: EmbedResponse =
            serde_json::from_str(r#"{"model":"m","embeddings":[[0.1,0.2],[0.3,0.4]]}"#).unwrap();
        assert_eq!(resp.embeddings.len(), 2);
    }

    #[test]
    fn embed_before_health_check_is_unavailable() {
        let p = OllamaEmbeddingProvider::new("m".into(), 4, "http://127.0.0.1:9/".into());
        let err = p.embed("x").unwrap_err();
        assert_eq!(
            err.kind(),
            somnus_core::errors::ErrorKind::CollaboratorUnavailable
        );
        assert!(p.embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn failed_health_check_keeps_provider_unavailable() {
        let p = OllamaEmbeddingProvider::new("m".into(), 4, "http://127.0.0.1:9".into());
        assert!(!p.health_check());
        assert!(!p.is_available());
    }
}
