//! JSON scenario fixtures.
//!
//! Event timestamps are stored as minute offsets before "now" so scenarios
//! always fall inside the lookback window.

use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use somnus_core::models::{ConsolidationState, EpisodicEvent, EventType};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub project_id: String,
    pub events: Vec<ScenarioEvent>,
    #[serde(default)]
    pub expected: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEvent {
    pub id: String,
    pub content: String,
    pub event_type: EventType,
    pub minutes_ago: i64,
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(default = "default_importance")]
    pub importance: f64,
}

fn default_importance() -> f64 {
    0.5
}

impl Scenario {
    /// Load `scenarios/<name>.json`.
    pub fn load(name: &str) -> Self {
        crate::load_fixture(&format!("scenarios/{name}.json"))
    }

    /// Materialize events relative to the current time.
    pub fn to_events(&self) -> Vec<EpisodicEvent> {
        let now = Utc::now();
        self.events
            .iter()
            .map(|e| EpisodicEvent {
                id: e.id.clone(),
                project_id: self.project_id.clone(),
                content: e.content.clone(),
                event_type: e.event_type,
                context: e.context.clone(),
                timestamp: now - Duration::minutes(e.minutes_ago),
                importance: e.importance,
                consolidation_state: ConsolidationState::Unconsolidated,
            })
            .collect()
    }

    pub fn expected_usize(&self, key: &str) -> Option<usize> {
        self.expected
            .get(key)
            .and_then(Value::as_u64)
            .map(|v| v as usize)
    }
}
