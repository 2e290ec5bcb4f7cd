use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evidence::EvidenceType;
use super::lifecycle::LifecycleState;
use super::pattern::PatternType;
use crate::errors::ValidationError;

/// A durable, consolidated knowledge record derived from episodic events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticMemory {
    /// UUID v4 identifier.
    pub id: String,
    pub project_id: String,
    pub content: String,
    /// Embedding of `content`. `None` when the embedding service was down
    /// at creation time.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    /// 0.0–1.0. Memories stored between the discard floor and the pattern
    /// confidence threshold are implicitly flagged for review by a low score.
    pub quality_score: f64,
    pub evidence_type: EvidenceType,
    /// 0.0–1.0.
    pub evidence_quality: f64,
    /// Ordered set of contributing event ids. Never empty.
    pub source_event_ids: Vec<String>,
    pub pattern_type: PatternType,
    pub lifecycle_state: LifecycleState,
    /// Optimistic-concurrency stamp, bumped on every state change.
    pub version: u64,
    pub last_retrieved_at: Option<DateTime<Utc>>,
    pub labile_until: Option<DateTime<Utc>>,
    /// Winner of the contradiction that superseded this memory.
    pub superseded_by: Option<String>,
    /// blake3 hash of `content`.
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

impl SemanticMemory {
    pub fn compute_content_hash(content: &str) -> String {
        blake3::hash(content.as_bytes()).to_hex().to_string()
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle_state.is_active()
    }

    /// Check the invariants a memory must satisfy before it is persisted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source_event_ids.is_empty() {
            return Err(ValidationError::EmptySourceEvents {
                memory_id: self.id.clone(),
            });
        }
        for (field, value) in [
            ("quality_score", self.quality_score),
            ("evidence_quality", self.evidence_quality),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::OutOfRange {
                    id: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Move to `next` if the state machine allows it. Does not touch
    /// `version`; callers decide how a write is stamped.
    pub fn transition_to(&mut self, next: LifecycleState) -> Result<(), ValidationError> {
        if self.lifecycle_state == LifecycleState::Superseded {
            return Err(ValidationError::Immutable {
                memory_id: self.id.clone(),
            });
        }
        if !self.lifecycle_state.can_transition_to(next) {
            return Err(ValidationError::IllegalTransition {
                memory_id: self.id.clone(),
                from: self.lifecycle_state.as_str(),
                to: next.as_str(),
            });
        }
        self.lifecycle_state = next;
        Ok(())
    }
}

/// Identity equality: two memories are equal if they have the same ID.
impl PartialEq for SemanticMemory {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
