//! Degradation events: which collaborator failed, how, and what the run fell
//! back to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tracing_setup::events;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub component: String,
    pub failure: String,
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded log of recent degradations.
#[derive(Debug, Clone)]
pub struct DegradationTracker {
    events: Vec<DegradationEvent>,
    capacity: usize,
}

impl DegradationTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record and log a degradation, evicting the oldest past capacity.
    pub fn record(&mut self, component: &str, failure: &str, fallback: &str) {
        events::degradation_triggered(component, failure, fallback);
        if self.events.len() == self.capacity {
            self.events.remove(0);
        }
        self.events.push(DegradationEvent {
            component: component.to_string(),
            failure: failure.to_string(),
            fallback_used: fallback.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn events(&self) -> &[DegradationEvent] {
        &self.events
    }

    /// Count events for a component within the last `window_secs` seconds.
    pub fn count_recent(&self, component: &str, window_secs: i64) -> usize {
        let cutoff = Utc::now() - chrono::Duration::seconds(window_secs);
        self.events
            .iter()
            .filter(|e| e.component == component && e.timestamp >= cutoff)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for DegradationTracker {
    fn default() -> Self {
        Self::new(somnus_core::constants::MAX_RUN_HISTORY)
    }
}
