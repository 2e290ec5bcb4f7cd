//! Consolidation pipeline for one project run.
//!
//! Window closing → Phase 1: Selection → Phase 2: Clustering →
//! Phase 3: Extraction → Phase 4: Abstraction → Phase 5: Integration →
//! Phase 6: Persistence → contradiction pass → event marking.
//!
//! Every failure is counted on the [`RunReport`] and the run carries on with
//! a cheaper signal; nothing in here aborts a run.

pub mod phase1_selection;
pub mod phase2_clustering;
pub mod phase3_extraction;
pub mod phase4_abstraction;
pub mod phase5_integration;
pub mod phase6_persistence;

use std::sync::Mutex;

use chrono::Utc;
use rayon::ThreadPool;
use tracing::{error, info, warn};

use somnus_core::config::SomnusConfig;
use somnus_core::errors::{ErrorKind, SomnusError};
use somnus_core::models::{ConsolidationStrategy, RunReport, RunStatus, SemanticMemory};
use somnus_core::traits::{IEmbeddingProvider, IEventStore, IMemoryStore};
use somnus_observability::{contradiction_span, reconsolidation_span, DegradationTracker};
use somnus_reconsolidation::ReconsolidationActivator;
use somnus_validation::ContradictionDetector;

use crate::clustering::EventClusterer;
use crate::evidence::EvidenceInferencer;
use crate::extraction::{Cluster, ExtractionResult, PatternExtractor};
use crate::scheduling::{CancellationToken, Throttle, ThrottleConfig};
use phase5_integration::IntegrationAction;

/// Everything a run needs, borrowed from the engine.
pub struct PipelineContext<'a> {
    pub config: &'a SomnusConfig,
    pub events: &'a dyn IEventStore,
    pub memories: &'a dyn IMemoryStore,
    pub embedder: &'a dyn IEmbeddingProvider,
    pub clusterer: &'a EventClusterer,
    pub inferencer: &'a EvidenceInferencer,
    pub extractor: &'a PatternExtractor,
    pub activator: &'a ReconsolidationActivator,
    pub detector: &'a ContradictionDetector,
    pub pool: &'a ThreadPool,
    pub degradations: &'a Mutex<DegradationTracker>,
}

impl PipelineContext<'_> {
    fn degrade(&self, component: &str, failure: &str, fallback: &str) {
        let mut tracker = self
            .degradations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tracker.record(component, failure, fallback);
    }
}

/// Run every phase for `project_id`, filling in `report`.
pub fn run_pipeline(
    ctx: &PipelineContext<'_>,
    project_id: &str,
    strategy: ConsolidationStrategy,
    dry_run: bool,
    cancel: &CancellationToken,
    report: &mut RunReport,
) {
    close_windows(ctx, project_id, dry_run, report);

    // Phase 1: Selection.
    let events = match phase1_selection::select_events(
        ctx.events,
        project_id,
        ctx.config.consolidation.lookback(),
    ) {
        Ok(events) => events,
        Err(e) => {
            error!(project_id, error = %e, "could not fetch unconsolidated events");
            report.persistence_failures += 1;
            ctx.degrade("event_store", &e.to_string(), "no events this run");
            Vec::new()
        }
    };
    report.events_processed = events.len();
    info!(count = events.len(), "Phase 1: selected events");

    let (embeddings, embed_failure) = phase1_selection::embed_events(ctx.embedder, &events);
    if let Some(reason) = embed_failure {
        report.embedding_failures += 1;
        ctx.degrade("embedding", &reason, "session and time proximity clustering");
    }

    // Phase 2: Clustering.
    let clusters =
        phase2_clustering::build_clusters(ctx.clusterer, ctx.inferencer, &events, &embeddings);
    report.clusters_formed = clusters.len();
    info!(clusters = clusters.len(), "Phase 2: clustering complete");

    // Phase 3: Extraction.
    if !clusters.is_empty() {
        ctx.extractor.refresh_reasoner();
    }
    let extraction =
        phase3_extraction::extract_all(ctx.pool, ctx.extractor, &clusters, strategy, cancel);
    if extraction.cancelled {
        warn!(project_id, "run cancelled, skipping remaining clusters");
        report.status = RunStatus::Cancelled;
    }
    let results: Vec<&ExtractionResult> = extraction.results.iter().flatten().collect();
    for result in &results {
        report.patterns_extracted += result.patterns.len();
        if result.used_slow_path {
            report.used_slow_path_count += 1;
        }
        if result.discarded {
            report.clusters_discarded += 1;
        }
        if let Some(reason) = &result.slow_path_error {
            report.slow_path_failures += 1;
            ctx.degrade("reasoner", reason, "system-1 patterns");
        }
    }
    info!(
        extracted = results.len(),
        patterns = report.patterns_extracted,
        slow_path = report.used_slow_path_count,
        "Phase 3: extraction complete"
    );

    // Phases 4-6: Abstraction, Integration, Persistence.
    let mut active = match ctx.memories.list_active(project_id) {
        Ok(active) => active,
        Err(e) => {
            error!(project_id, error = %e, "could not load active memories");
            report.persistence_failures += 1;
            Vec::new()
        }
    };
    let mut created = Vec::new();
    let mut to_mark = Vec::new();
    let mut throttle = Throttle::new(ThrottleConfig::from(&ctx.config.consolidation));
    for result in results.iter().filter(|r| !r.patterns.is_empty()) {
        let cluster = &clusters[result.cluster_index];
        let stored = integrate_cluster(
            ctx,
            project_id,
            cluster,
            result,
            dry_run,
            &mut active,
            &mut created,
            &mut throttle,
            report,
        );
        if stored {
            to_mark.extend(cluster.event_ids());
        }
    }

    // Contradiction pass against the active set, new memories included.
    {
        let _span = contradiction_span!(project_id).entered();
        let found = ctx.detector.run(project_id, &created, &active, dry_run);
        report.contradictions_detected = found.detected;
        report.contradictions_resolved = found.resolved;
        report.contradictions_deferred = found.deferred;
        report.contradictions_needing_review = found.needing_review;
        report.persistence_failures += found.persistence_failures;
        report.validation_failures += found.validation_failures;
    }

    // Source events flip only after their memories are durable.
    if !to_mark.is_empty() {
        if dry_run {
            report.events_marked_consolidated = to_mark.len();
        } else {
            match ctx.events.mark_consolidated(&to_mark) {
                Ok(()) => report.events_marked_consolidated = to_mark.len(),
                Err(e) => {
                    error!(project_id, error = %e, "failed to mark events consolidated");
                    report.persistence_failures += 1;
                }
            }
        }
    }

    report.degraded_mode = report.failure_count() > 0;
}

fn close_windows(
    ctx: &PipelineContext<'_>,
    project_id: &str,
    dry_run: bool,
    report: &mut RunReport,
) {
    let _span = reconsolidation_span!(project_id).entered();
    match ctx.activator.close_expired_windows(project_id, dry_run) {
        Ok(closed) => {
            report.windows_closed = closed.closed;
            report.windows_recovered = closed.recovered;
            report.persistence_failures += closed.failures;
            if closed.conflicts > 0 {
                info!(
                    project_id,
                    conflicts = closed.conflicts,
                    "windows changed underneath, retrying next run"
                );
            }
        }
        Err(e) => {
            error!(project_id, error = %e, "could not close expired windows");
            report.persistence_failures += 1;
        }
    }
}

/// Build, integrate and persist every pattern of one cluster.
///
/// Returns true when every pattern was stored (created or queued), which
/// makes the cluster's events eligible for marking.
#[allow(clippy::too_many_arguments)]
fn integrate_cluster(
    ctx: &PipelineContext<'_>,
    project_id: &str,
    cluster: &Cluster,
    result: &ExtractionResult,
    dry_run: bool,
    active: &mut Vec<SemanticMemory>,
    created: &mut Vec<SemanticMemory>,
    throttle: &mut Throttle,
    report: &mut RunReport,
) -> bool {
    let mut all_stored = true;
    for pattern in &result.patterns {
        // Phase 4: Abstraction.
        let mut memory =
            match phase4_abstraction::build_memory(pattern, cluster, project_id, Utc::now()) {
                Ok(memory) => memory,
                Err(e) => {
                    error!(cluster = cluster.index, error = %e, "dropping invalid memory");
                    report.validation_failures += 1;
                    all_stored = false;
                    continue;
                }
            };
        memory.embedding = embed_memory(ctx, &memory, report);

        // Phase 5: Integration.
        let action = phase5_integration::determine_action(
            memory,
            active,
            ctx.config.consolidation.merge_similarity_threshold,
        );

        // Phase 6: Persistence.
        if !dry_run {
            match phase6_persistence::persist(ctx.memories, &action, throttle) {
                Ok(Some(revised)) => {
                    if let Some(slot) = active.iter_mut().find(|m| m.id == revised.id) {
                        *slot = revised;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    count_write_failure(report, cluster.index, &e);
                    all_stored = false;
                    continue;
                }
            }
        }
        match action {
            IntegrationAction::Create(memory) => {
                report.memories_created += 1;
                active.push(memory.clone());
                created.push(memory);
            }
            IntegrationAction::Update { .. } => report.memories_updated += 1,
        }
    }
    all_stored
}

fn embed_memory(
    ctx: &PipelineContext<'_>,
    memory: &SemanticMemory,
    report: &mut RunReport,
) -> Option<Vec<f32>> {
    if !ctx.embedder.is_available() {
        return None;
    }
    match ctx.embedder.embed(&memory.content) {
        Ok(vector) => Some(vector),
        Err(e) => {
            report.embedding_failures += 1;
            ctx.degrade("embedding", &e.to_string(), "memory stored without embedding");
            None
        }
    }
}

fn count_write_failure(report: &mut RunReport, cluster: usize, e: &SomnusError) {
    error!(cluster, error = %e, "failed to persist memory");
    if e.kind() == ErrorKind::ValidationFailure {
        report.validation_failures += 1;
    } else {
        report.persistence_failures += 1;
    }
}
