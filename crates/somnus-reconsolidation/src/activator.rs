//! ReconsolidationActivator: the retrieval path opens labile windows, the
//! batch path closes expired ones.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use somnus_core::config::ReconsolidationConfig;
use somnus_core::errors::{SomnusResult, StorageError};
use somnus_core::models::{LifecycleState, SemanticMemory};
use somnus_core::traits::IMemoryStore;
use somnus_observability::tracing_setup::events;

use crate::window;

/// Outcome of one window-closing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconsolidationReport {
    /// Expired labile windows closed.
    pub closed: usize,
    /// Memories found mid-close (reconsolidating) and force-closed.
    pub recovered: usize,
    /// Closes skipped because the version moved under us.
    pub conflicts: usize,
    /// Closes that folded in a queued update.
    pub updates_applied: usize,
    /// Per-memory write or validation failures.
    pub failures: usize,
}

pub struct ReconsolidationActivator {
    memories: Arc<dyn IMemoryStore>,
    window: Duration,
}

impl ReconsolidationActivator {
    pub fn new(config: &ReconsolidationConfig, memories: Arc<dyn IMemoryStore>) -> Self {
        Self {
            memories,
            window: config.window(),
        }
    }

    /// Open a labile window on `memory_id` if it is consolidated.
    ///
    /// Returns `Ok(true)` when this call opened the window. Any other state,
    /// or losing the CAS to a concurrent writer, is `Ok(false)`. A missing
    /// memory is `NotFound`.
    pub fn activate_on_retrieval(&self, memory_id: &str) -> SomnusResult<bool> {
        let memory = self
            .memories
            .get(memory_id)?
            .ok_or_else(|| StorageError::NotFound {
                entity: "memory",
                id: memory_id.to_string(),
            })?;

        if memory.lifecycle_state != LifecycleState::Consolidated {
            debug!(
                memory_id,
                state = memory.lifecycle_state.as_str(),
                "not consolidated, activation is a no-op"
            );
            return Ok(false);
        }

        let opened = window::open(&memory, self.window, Utc::now())?;
        let swapped = self.memories.compare_and_swap(&opened, memory.version)?;
        if swapped {
            debug!(memory_id, version = opened.version, "labile window opened");
        }
        Ok(swapped)
    }

    /// Close every expired labile window of `project_id` and force-close
    /// memories left in `reconsolidating` by an interrupted run.
    ///
    /// With `dry_run`, only counts what would be closed or recovered.
    /// Errors only when the candidate lists cannot be read.
    pub fn close_expired_windows(
        &self,
        project_id: &str,
        dry_run: bool,
    ) -> SomnusResult<ReconsolidationReport> {
        self.close_expired_windows_at(project_id, Utc::now(), dry_run)
    }

    /// [`close_expired_windows`](Self::close_expired_windows) against an
    /// explicit clock.
    pub fn close_expired_windows_at(
        &self,
        project_id: &str,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> SomnusResult<ReconsolidationReport> {
        let mut report = ReconsolidationReport::default();

        let stranded = self
            .memories
            .list_by_state(project_id, LifecycleState::Reconsolidating)?;
        let expired: Vec<SemanticMemory> = self
            .memories
            .list_by_state(project_id, LifecycleState::Labile)?
            .into_iter()
            .filter(|m| window::is_expired(m, now))
            .collect();

        if dry_run {
            report.recovered = stranded.len();
            report.closed = expired.len();
            return Ok(report);
        }

        for memory in &stranded {
            warn!(memory_id = %memory.id, version = memory.version, "recovering interrupted window close");
            if self.commit(memory, &mut report) {
                report.recovered += 1;
            }
        }

        for memory in &expired {
            let claimed = match window::claim(memory) {
                Ok(c) => c,
                Err(e) => {
                    error!(memory_id = %memory.id, error = %e, "cannot claim labile memory");
                    report.failures += 1;
                    continue;
                }
            };
            match self.memories.compare_and_swap(&claimed, memory.version) {
                Ok(true) => {}
                Ok(false) => {
                    debug!(memory_id = %memory.id, "window claimed elsewhere, skipping");
                    report.conflicts += 1;
                    continue;
                }
                Err(e) => {
                    error!(memory_id = %memory.id, error = %e, "claim write failed");
                    report.failures += 1;
                    continue;
                }
            }
            if self.commit(&claimed, &mut report) {
                report.closed += 1;
            }
        }

        if report.closed + report.recovered + report.conflicts + report.failures > 0 {
            info!(
                project_id,
                closed = report.closed,
                recovered = report.recovered,
                conflicts = report.conflicts,
                failures = report.failures,
                "reconsolidation windows processed"
            );
        }
        Ok(report)
    }

    /// `reconsolidating(v) → consolidated(v)` guarded on `v`. A memory left
    /// reconsolidating by a failed commit is recovered on the next pass.
    fn commit(&self, memory: &SemanticMemory, report: &mut ReconsolidationReport) -> bool {
        let pending = match self.memories.pending_update(&memory.id) {
            Ok(p) => p,
            Err(e) => {
                error!(memory_id = %memory.id, error = %e, "cannot read pending update");
                report.failures += 1;
                return false;
            }
        };
        let committed = match window::commit(memory, pending.as_ref()) {
            Ok(c) => c,
            Err(e) => {
                error!(memory_id = %memory.id, error = %e, "cannot commit window close");
                report.failures += 1;
                return false;
            }
        };
        match self.memories.compare_and_swap(&committed, memory.version) {
            Ok(true) => {}
            Ok(false) => {
                report.conflicts += 1;
                return false;
            }
            Err(e) => {
                error!(memory_id = %memory.id, error = %e, "commit write failed");
                report.failures += 1;
                return false;
            }
        }

        let applied = pending.is_some();
        if applied {
            report.updates_applied += 1;
            if let Err(e) = self.memories.clear_pending_update(&memory.id) {
                warn!(memory_id = %memory.id, error = %e, "applied update could not be cleared");
            }
        }
        events::window_closed(&memory.id, committed.version, applied);
        true
    }
}
