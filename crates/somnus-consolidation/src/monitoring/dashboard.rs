//! Surface consolidation run health through observability.

use serde::Serialize;

use somnus_core::models::{RunReport, RunStatus};

/// Snapshot of consolidation health.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsolidationDashboard {
    /// Total consolidation runs, skipped ones included.
    pub total_runs: usize,
    pub degraded_runs: usize,
    pub cancelled_runs: usize,
    pub skipped_runs: usize,
    pub total_memories_created: usize,
    pub total_memories_updated: usize,
    pub total_contradictions_resolved: usize,
    /// Degraded runs over runs that actually executed (0.0–1.0).
    pub degraded_rate: f64,
    pub latest: Option<RunReport>,
}

impl ConsolidationDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a consolidation run.
    pub fn record_run(&mut self, report: &RunReport) {
        self.total_runs += 1;
        match report.status {
            RunStatus::Skipped => self.skipped_runs += 1,
            RunStatus::Cancelled => self.cancelled_runs += 1,
            RunStatus::Completed => {}
        }
        if report.degraded_mode {
            self.degraded_runs += 1;
        }
        self.total_memories_created += report.memories_created;
        self.total_memories_updated += report.memories_updated;
        self.total_contradictions_resolved += report.contradictions_resolved;

        let executed = self.total_runs - self.skipped_runs;
        self.degraded_rate = if executed > 0 {
            self.degraded_runs as f64 / executed as f64
        } else {
            0.0
        };
        self.latest = Some(report.clone());
    }
}
