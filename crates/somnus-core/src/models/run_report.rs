use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a consolidation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Completed,
    /// Stopped between extraction tasks; work done so far is kept.
    Cancelled,
    /// Another run held the project lock.
    Skipped,
}

/// Summary of one consolidation run. Always returned, even on partial failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub project_id: String,
    pub status: RunStatus,
    pub dry_run: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,

    pub events_processed: usize,
    pub clusters_formed: usize,
    pub clusters_discarded: usize,
    pub patterns_extracted: usize,
    pub memories_created: usize,
    pub memories_updated: usize,
    pub events_marked_consolidated: usize,

    pub windows_closed: usize,
    pub windows_recovered: usize,

    pub contradictions_detected: usize,
    pub contradictions_resolved: usize,
    pub contradictions_deferred: usize,
    pub contradictions_needing_review: usize,

    pub used_slow_path_count: usize,
    pub slow_path_failures: usize,
    pub embedding_failures: usize,
    pub persistence_failures: usize,
    pub validation_failures: usize,

    /// Set whenever any non-fatal failure occurred during the run.
    pub degraded_mode: bool,
}

impl RunReport {
    pub fn new(project_id: &str, dry_run: bool) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            dry_run,
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Total count of per-item failures across phases.
    pub fn failure_count(&self) -> usize {
        self.slow_path_failures
            + self.embedding_failures
            + self.persistence_failures
            + self.validation_failures
    }
}
