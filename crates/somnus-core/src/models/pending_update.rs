use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A content revision queued for a memory, applied when its labile window
/// closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub memory_id: String,
    pub content: String,
    /// Event ids to union into the memory's sources.
    pub source_event_ids: Vec<String>,
    pub quality_score: f64,
    pub evidence_quality: f64,
    pub queued_at: DateTime<Utc>,
}

impl PendingUpdate {
    /// Fold a newer update for the same memory into this one.
    pub fn merge(&mut self, newer: PendingUpdate) {
        self.content = newer.content;
        for id in newer.source_event_ids {
            if !self.source_event_ids.contains(&id) {
                self.source_event_ids.push(id);
            }
        }
        self.quality_score = self.quality_score.max(newer.quality_score);
        self.evidence_quality = self.evidence_quality.max(newer.evidence_quality);
        self.queued_at = newer.queued_at;
    }
}
