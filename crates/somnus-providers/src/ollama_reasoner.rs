//! Ollama reasoning client (`POST /api/generate`, non-streaming).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use somnus_core::errors::{CollaboratorError, SomnusResult};
use somnus_core::traits::IReasoner;

const COLLABORATOR: &str = "ollama-reasoner";

pub struct OllamaReasoner {
    base_url: String,
    model: String,
    available: AtomicBool,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaReasoner {
    pub fn new(model: String, base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            available: AtomicBool::new(false),
        }
    }
}

impl IReasoner for OllamaReasoner {
    fn reason(&self, prompt: &str, timeout: Duration) -> SomnusResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
        };
        let timeout_ms = timeout.as_millis() as u64;

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CollaboratorError::Unavailable {
                collaborator: COLLABORATOR.to_string(),
                reason: format!("runtime error: {e}"),
            })?;

        rt.block_on(async {
            let response = reqwest::Client::new()
                .post(&url)
                .timeout(timeout)
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        CollaboratorError::Timeout {
                            collaborator: COLLABORATOR.to_string(),
                            timeout_ms,
                        }
                    } else {
                        CollaboratorError::Unavailable {
                            collaborator: COLLABORATOR.to_string(),
                            reason: e.to_string(),
                        }
                    }
                })?;
            if !response.status().is_success() {
                return Err(CollaboratorError::Unavailable {
                    collaborator: COLLABORATOR.to_string(),
                    reason: format!("returned {}", response.status()),
                }
                .into());
            }
            let body: GenerateResponse =
                response
                    .json()
                    .await
                    .map_err(|e| CollaboratorError::MalformedResponse {
                        collaborator: COLLABORATOR.to_string(),
                        reason: e.to_string(),
                    })?;
            Ok(body.response)
        })
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
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use somnus_core::errors::ErrorKind;

    #[test]
    fn refused_connection_is_collaborator_unavailable() {
        let r = OllamaReasoner::new("llama".into(), "http://127.0.0.1:9".into());
        let err = r.reason("hi", Duration::from_secs(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);
    }

    #[test]
    fn unreachable_reasoner_is_configured_but_unavailable() {
        let r = OllamaReasoner::new("llama".into(), "http://127.0.0.1:9".into());
        assert!(!r.health_check());
        assert!(!r.is_available());
        assert!(r.is_configured());
    }

    #[test]
    fn generate_response_parses() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"model":"m","response":"{\"confidence\":0.8}","done":true}"#)
                .unwrap();
        assert!(body.response.contains("confidence"));
    }
}
