use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    CONTEXT_ACTIVATION_COUNT, CONTEXT_CONFIDENCE, CONTEXT_OUTCOME, CONTEXT_SESSION_ID,
    CONTEXT_SOURCE,
};

/// Kind of thing an episodic event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Action,
    Decision,
    Outcome,
    Observation,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Action => "action",
            EventType::Decision => "decision",
            EventType::Outcome => "outcome",
            EventType::Observation => "observation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "action" => Some(EventType::Action),
            "decision" => Some(EventType::Decision),
            "outcome" => Some(EventType::Outcome),
            "observation" => Some(EventType::Observation),
            _ => None,
        }
    }
}

/// Whether an event has already been folded into semantic memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationState {
    #[default]
    Unconsolidated,
    Consolidated,
}

impl ConsolidationState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConsolidationState::Unconsolidated => "unconsolidated",
            ConsolidationState::Consolidated => "consolidated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unconsolidated" => Some(ConsolidationState::Unconsolidated),
            "consolidated" => Some(ConsolidationState::Consolidated),
            _ => None,
        }
    }
}

/// A raw, timestamped record of something that happened.
///
/// Owned by the external event store; the engine only reads it and asks the
/// store to flip `consolidation_state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodicEvent {
    pub id: String,
    pub project_id: String,
    pub content: String,
    pub event_type: EventType,
    /// Structured key-value blob. See `constants::CONTEXT_*` for the keys
    /// the engine reads.
    #[serde(default)]
    pub context: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
    /// 0.0–1.0.
    pub importance: f64,
    #[serde(default)]
    pub consolidation_state: ConsolidationState,
}

impl EpisodicEvent {
    pub fn session_id(&self) -> Option<&str> {
        self.context_str(CONTEXT_SESSION_ID)
    }

    pub fn explicit_confidence(&self) -> Option<&Value> {
        self.context.get(CONTEXT_CONFIDENCE)
    }

    pub fn activation_count(&self) -> Option<u64> {
        self.context
            .get(CONTEXT_ACTIVATION_COUNT)
            .and_then(Value::as_u64)
    }

    pub fn outcome_label(&self) -> Option<&str> {
        self.context_str(CONTEXT_OUTCOME)
    }

    pub fn source(&self) -> Option<&str> {
        self.context_str(CONTEXT_SOURCE)
    }

    pub fn is_consolidated(&self) -> bool {
        self.consolidation_state == ConsolidationState::Consolidated
    }

    fn context_str(&self, key: &str) -> Option<&str> {
        self.context
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_accessors() {
        let event: EpisodicEvent = serde_json::from_value(json!({
            "id": "e1",
            "project_id": "p",
            "content": "ran the tests",
            "event_type": "action",
            "context": {"session_id": "s-1", "activation_count": 3, "outcome": ""},
            "timestamp": "2026-01-01T00:00:00Z",
            "importance": 0.5
        }))
        .unwrap();
        assert_eq!(event.session_id(), Some("s-1"));
        assert_eq!(event.activation_count(), Some(3));
        assert_eq!(event.outcome_label(), None);
        assert!(!event.is_consolidated());
    }

    #[test]
    fn event_type_round_trips_through_str() {
        for t in [
            EventType::Action,
            EventType::Decision,
            EventType::Outcome,
            EventType::Observation,
        ] {
            assert_eq!(EventType::parse(t.as_str()), Some(t));
        }
        assert_eq!(EventType::parse("dream"), None);
    }
}
