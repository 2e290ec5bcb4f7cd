//! Deterministic embedding providers for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use somnus_core::errors::{CollaboratorError, SomnusResult};
use somnus_core::traits::IEmbeddingProvider;

/// Bag-of-words embedder: each lowercase token is hashed with blake3 into one
/// of `dims` buckets. Texts sharing most tokens land close together.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

impl IEmbeddingProvider for HashEmbedder {
    fn embed(&self, text: &str) -> SomnusResult<Vec<f32>> {
        let mut v = vec![0.0f32; self.dims];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = blake3::hash(token.to_lowercase().as_bytes());
            let bytes = hash.as_bytes();
            let bucket = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
            v[bucket % self.dims] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "hash"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Returns fixed vectors for known texts; unknown texts get `fallback`, or an
/// error when no fallback is set.
pub struct ScriptedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Option<Vec<f32>>,
    dims: usize,
}

impl ScriptedEmbedder {
    pub fn new(dims: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            fallback: None,
            dims,
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn with_fallback(mut self, vector: Vec<f32>) -> Self {
        self.fallback = Some(vector);
        self
    }
}

impl IEmbeddingProvider for ScriptedEmbedder {
    fn embed(&self, text: &str) -> SomnusResult<Vec<f32>> {
        self.vectors
            .get(text)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| {
                CollaboratorError::Unavailable {
                    collaborator: "scripted-embedder".to_string(),
                    reason: format!("no vector scripted for {text:?}"),
                }
                .into()
            })
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Always fails, counting calls.
#[derive(Default)]
pub struct FailingEmbedder {
    pub calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IEmbeddingProvider for FailingEmbedder {
    fn embed(&self, _text: &str) -> SomnusResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CollaboratorError::Unavailable {
            collaborator: "failing-embedder".to_string(),
            reason: "embedding service down".to_string(),
        }
        .into())
    }

    fn dimensions(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn is_available(&self) -> bool {
        false
    }
}
