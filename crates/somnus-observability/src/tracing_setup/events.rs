//! Structured log events for key operations.

use somnus_core::models::RunReport;

pub fn run_completed(report: &RunReport) {
    tracing::info!(
        event = "run_completed",
        project_id = %report.project_id,
        run_id = %report.run_id,
        status = ?report.status,
        dry_run = report.dry_run,
        events_processed = report.events_processed,
        memories_created = report.memories_created,
        memories_updated = report.memories_updated,
        contradictions_detected = report.contradictions_detected,
        contradictions_resolved = report.contradictions_resolved,
        used_slow_path = report.used_slow_path_count,
        degraded = report.degraded_mode,
        duration_ms = report.duration_ms,
        "consolidation run completed"
    );
}

pub fn memory_created(memory_id: &str, pattern_type: &str, quality: f64) {
    tracing::info!(
        event = "memory_created",
        memory_id = %memory_id,
        pattern_type = %pattern_type,
        quality = quality,
        "memory created"
    );
}

pub fn memory_superseded(memory_id: &str, winner_id: &str) {
    tracing::info!(
        event = "memory_superseded",
        memory_id = %memory_id,
        winner_id = %winner_id,
        "memory superseded"
    );
}

pub fn contradiction_detected(memory_id_a: &str, memory_id_b: &str, kind: &str, severity: f64) {
    tracing::warn!(
        event = "contradiction_detected",
        memory_id_a = %memory_id_a,
        memory_id_b = %memory_id_b,
        contradiction_type = %kind,
        severity = severity,
        "contradiction detected"
    );
}

pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

pub fn window_closed(memory_id: &str, version: u64, applied_update: bool) {
    tracing::debug!(
        event = "window_closed",
        memory_id = %memory_id,
        version = version,
        applied_update = applied_update,
        "reconsolidation window closed"
    );
}
