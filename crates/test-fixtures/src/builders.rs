//! Builders for events and memories with sensible test defaults.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Map, Value};

use somnus_core::models::{
    ConsolidationState, EpisodicEvent, EventType, EvidenceType, LifecycleState, PatternType,
    SemanticMemory,
};

/// Fixed reference instant so tests that build absolute timestamps are
/// reproducible.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub struct EventBuilder {
    event: EpisodicEvent,
}

impl EventBuilder {
    pub fn new(id: &str, content: &str) -> Self {
        Self {
            event: EpisodicEvent {
                id: id.to_string(),
                project_id: "proj".to_string(),
                content: content.to_string(),
                event_type: EventType::Observation,
                context: Map::new(),
                timestamp: Utc::now() - Duration::hours(1),
                importance: 0.5,
                consolidation_state: ConsolidationState::Unconsolidated,
            },
        }
    }

    pub fn project(mut self, project_id: &str) -> Self {
        self.event.project_id = project_id.to_string();
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event.event_type = event_type;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.event.timestamp = timestamp;
        self
    }

    /// Timestamp `minutes` before now.
    pub fn minutes_ago(mut self, minutes: i64) -> Self {
        self.event.timestamp = Utc::now() - Duration::minutes(minutes);
        self
    }

    pub fn session(self, session_id: &str) -> Self {
        self.context("session_id", Value::from(session_id))
    }

    pub fn outcome(self, outcome: &str) -> Self {
        self.context("outcome", Value::from(outcome))
    }

    pub fn confidence(self, confidence: f64) -> Self {
        self.context("confidence", Value::from(confidence))
    }

    pub fn activations(self, count: u64) -> Self {
        self.context("activation_count", Value::from(count))
    }

    pub fn context(mut self, key: &str, value: Value) -> Self {
        self.event.context.insert(key.to_string(), value);
        self
    }

    pub fn importance(mut self, importance: f64) -> Self {
        self.event.importance = importance;
        self
    }

    pub fn consolidated(mut self) -> Self {
        self.event.consolidation_state = ConsolidationState::Consolidated;
        self
    }

    pub fn build(self) -> EpisodicEvent {
        self.event
    }
}

pub struct MemoryBuilder {
    memory: SemanticMemory,
}

impl MemoryBuilder {
    pub fn new(id: &str, content: &str) -> Self {
        Self {
            memory: SemanticMemory {
                id: id.to_string(),
                project_id: "proj".to_string(),
                content: content.to_string(),
                embedding: None,
                quality_score: 0.8,
                evidence_type: EvidenceType::Observed,
                evidence_quality: 0.6,
                source_event_ids: vec![format!("{id}-src")],
                pattern_type: PatternType::Frequency,
                lifecycle_state: LifecycleState::Consolidated,
                version: 1,
                last_retrieved_at: None,
                labile_until: None,
                superseded_by: None,
                content_hash: SemanticMemory::compute_content_hash(content),
                created_at: Utc::now(),
            },
        }
    }

    pub fn project(mut self, project_id: &str) -> Self {
        self.memory.project_id = project_id.to_string();
        self
    }

    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.memory.embedding = Some(embedding);
        self
    }

    pub fn quality(mut self, quality_score: f64) -> Self {
        self.memory.quality_score = quality_score;
        self
    }

    pub fn evidence_quality(mut self, evidence_quality: f64) -> Self {
        self.memory.evidence_quality = evidence_quality;
        self
    }

    pub fn evidence_type(mut self, evidence_type: EvidenceType) -> Self {
        self.memory.evidence_type = evidence_type;
        self
    }

    pub fn sources(mut self, ids: &[&str]) -> Self {
        self.memory.source_event_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn state(mut self, state: LifecycleState) -> Self {
        self.memory.lifecycle_state = state;
        self
    }

    pub fn version(mut self, version: u64) -> Self {
        self.memory.version = version;
        self
    }

    pub fn labile_until(mut self, until: DateTime<Utc>) -> Self {
        self.memory.labile_until = Some(until);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.memory.created_at = created_at;
        self
    }

    pub fn build(self) -> SemanticMemory {
        self.memory
    }
}
