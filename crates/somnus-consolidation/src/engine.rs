//! ConsolidationEngine: per-project run guard, bounded extraction pool, run
//! history, and the retrieval-path entry point.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::info;

use somnus_core::config::SomnusConfig;
use somnus_core::errors::{ConfigError, SomnusResult};
use somnus_core::models::{Contradiction, ConsolidationStrategy, RunReport, RunStatus};
use somnus_core::traits::{
    IContradictionStore, IEmbeddingProvider, IEventStore, IMemoryStore, IReasoner,
};
use somnus_observability::tracing_setup::events;
use somnus_observability::{consolidation_span, DegradationEvent, DegradationTracker};
use somnus_reconsolidation::ReconsolidationActivator;
use somnus_storage::StorageEngine;
use somnus_validation::ContradictionDetector;

use crate::clustering::EventClusterer;
use crate::evidence::EvidenceInferencer;
use crate::extraction::PatternExtractor;
use crate::monitoring::{ConsolidationDashboard, RunHistory};
use crate::pipeline::{self, PipelineContext};
use crate::scheduling::{CancellationToken, ProjectLocks};

/// The main consolidation engine.
///
/// Runs of different projects may proceed in parallel; a second run of the
/// same project is skipped while the first holds the project lock.
pub struct ConsolidationEngine {
    config: SomnusConfig,
    events: Arc<dyn IEventStore>,
    memories: Arc<dyn IMemoryStore>,
    embedder: Arc<dyn IEmbeddingProvider>,
    clusterer: EventClusterer,
    inferencer: EvidenceInferencer,
    extractor: PatternExtractor,
    activator: ReconsolidationActivator,
    detector: ContradictionDetector,
    /// Extraction workers, sized `slow_path.concurrency`.
    pool: rayon::ThreadPool,
    locks: ProjectLocks,
    history: Mutex<RunHistory>,
    dashboard: Mutex<ConsolidationDashboard>,
    degradations: Mutex<DegradationTracker>,
}

impl ConsolidationEngine {
    /// Wire an engine from its collaborators. Fails on invalid config.
    pub fn new(
        config: SomnusConfig,
        events: Arc<dyn IEventStore>,
        memories: Arc<dyn IMemoryStore>,
        contradictions: Arc<dyn IContradictionStore>,
        embedder: Arc<dyn IEmbeddingProvider>,
        reasoner: Arc<dyn IReasoner>,
    ) -> SomnusResult<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.slow_path.concurrency)
            .thread_name(|i| format!("somnus-extract-{i}"))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "slow_path.concurrency".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            clusterer: EventClusterer::new(&config.consolidation),
            inferencer: EvidenceInferencer::new(),
            extractor: PatternExtractor::new(
                config.consolidation.clone(),
                config.slow_path.clone(),
                reasoner,
            ),
            activator: ReconsolidationActivator::new(&config.reconsolidation, memories.clone()),
            detector: ContradictionDetector::new(
                config.contradiction.clone(),
                memories.clone(),
                contradictions,
            ),
            pool,
            locks: ProjectLocks::new(),
            history: Mutex::new(RunHistory::default()),
            dashboard: Mutex::new(ConsolidationDashboard::new()),
            degradations: Mutex::new(DegradationTracker::default()),
            config,
            events,
            memories,
            embedder,
        })
    }

    /// Open the configured SQLite database and providers.
    pub fn from_config(config: SomnusConfig) -> SomnusResult<Self> {
        config.validate()?;
        let storage = Arc::new(StorageEngine::from_config(&config.storage)?);
        let embedder: Arc<dyn IEmbeddingProvider> =
            Arc::from(somnus_providers::create_embedding_provider(&config.providers));
        let reasoner: Arc<dyn IReasoner> =
            Arc::from(somnus_providers::create_reasoner(&config.providers));
        Self::new(
            config,
            storage.clone(),
            storage.clone(),
            storage,
            embedder,
            reasoner,
        )
    }

    pub fn config(&self) -> &SomnusConfig {
        &self.config
    }

    /// Whether a run currently holds `project_id`'s lock.
    pub fn is_running(&self, project_id: &str) -> bool {
        self.locks.is_running(project_id)
    }

    /// Run one consolidation cycle for `project_id`.
    pub fn run_consolidation(
        &self,
        project_id: &str,
        strategy: ConsolidationStrategy,
        dry_run: bool,
    ) -> RunReport {
        self.run_consolidation_with_cancel(project_id, strategy, dry_run, &CancellationToken::new())
    }

    /// [`run_consolidation`](Self::run_consolidation) that stops between
    /// extraction tasks once `cancel` is set.
    pub fn run_consolidation_with_cancel(
        &self,
        project_id: &str,
        strategy: ConsolidationStrategy,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::new(project_id, dry_run);
        let _span = consolidation_span!(project_id, report.run_id).entered();

        // Acquire the per-project guard.
        let Some(_guard) = self.locks.try_acquire(project_id, &report.run_id) else {
            info!(
                project_id,
                holder = self.locks.holder(project_id).unwrap_or_default(),
                "consolidation already in progress, skipping"
            );
            report.status = RunStatus::Skipped;
            self.finish(report.clone());
            return report;
        };

        let ctx = PipelineContext {
            config: &self.config,
            events: self.events.as_ref(),
            memories: self.memories.as_ref(),
            embedder: self.embedder.as_ref(),
            clusterer: &self.clusterer,
            inferencer: &self.inferencer,
            extractor: &self.extractor,
            activator: &self.activator,
            detector: &self.detector,
            pool: &self.pool,
            degradations: &self.degradations,
        };
        pipeline::run_pipeline(&ctx, project_id, strategy, dry_run, cancel, &mut report);

        report.duration_ms = started.elapsed().as_millis() as u64;
        self.finish(report.clone());
        report
    }

    fn finish(&self, report: RunReport) {
        events::run_completed(&report);
        lock(&self.dashboard).record_run(&report);
        lock(&self.history).push(report);
    }

    /// Open a reconsolidation window on a retrieved memory.
    ///
    /// Returns `Ok(true)` when this call opened the window.
    pub fn activate_on_retrieval(&self, memory_id: &str) -> SomnusResult<bool> {
        self.activator.activate_on_retrieval(memory_id)
    }

    /// Contradictions waiting for a human decision.
    pub fn needs_review(&self, project_id: &str) -> SomnusResult<Vec<Contradiction>> {
        self.detector.needs_review(project_id)
    }

    pub fn dashboard(&self) -> ConsolidationDashboard {
        lock(&self.dashboard).clone()
    }

    /// Most recent run reports, newest first.
    pub fn recent_runs(&self, limit: usize) -> Vec<RunReport> {
        lock(&self.history).recent(limit)
    }

    pub fn degradations(&self) -> Vec<DegradationEvent> {
        lock(&self.degradations).events().to_vec()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
