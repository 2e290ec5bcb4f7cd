//! ContradictionDetector: detect conflicts between new and active memories,
//! apply the severity policy, and resolve through version CAS.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use somnus_core::config::ContradictionConfig;
use somnus_core::errors::{ErrorKind, SomnusResult, ValidationError};
use somnus_core::models::{
    Contradiction, ContradictionStatus, LifecycleState, Resolution, SemanticMemory,
};
use somnus_core::similarity::cosine_similarity;
use somnus_core::traits::{IContradictionStore, IMemoryStore};
use somnus_observability::tracing_setup::events;

use crate::detection;
use crate::resolution;
use crate::severity;

/// What a resolution attempt did.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    /// The loser was superseded.
    Applied {
        resolution: Resolution,
        superseded: String,
    },
    /// A participant is labile or reconsolidating, or the CAS lost a race.
    Deferred,
    /// The would-be winner is no longer active; a human has to decide.
    Escalated,
    /// The supersede write failed.
    Failed,
}

/// Counts for one contradiction phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContradictionReport {
    pub detected: usize,
    pub resolved: usize,
    pub deferred: usize,
    pub needing_review: usize,
    pub audit_only: usize,
    pub persistence_failures: usize,
    pub validation_failures: usize,
    /// Ids of memories superseded in this phase.
    pub superseded: Vec<String>,
}

pub struct ContradictionDetector {
    config: ContradictionConfig,
    memories: Arc<dyn IMemoryStore>,
    store: Arc<dyn IContradictionStore>,
}

impl ContradictionDetector {
    pub fn new(
        config: ContradictionConfig,
        memories: Arc<dyn IMemoryStore>,
        store: Arc<dyn IContradictionStore>,
    ) -> Self {
        Self {
            config,
            memories,
            store,
        }
    }

    /// Compare each new memory with the active existing memories of its
    /// project. Pure: nothing is written.
    pub fn detect(
        &self,
        new: &[SemanticMemory],
        existing: &[SemanticMemory],
    ) -> Vec<Contradiction> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut found = Vec::new();

        for a in new.iter().filter(|m| m.is_active()) {
            let Some(ea) = a.embedding.as_deref() else {
                debug!(memory_id = %a.id, "no embedding, skipping contradiction check");
                continue;
            };
            for b in existing {
                if a.id == b.id || !b.is_active() || a.project_id != b.project_id {
                    continue;
                }
                let Some(eb) = b.embedding.as_deref() else {
                    continue;
                };
                let key = if a.id < b.id {
                    (a.id.clone(), b.id.clone())
                } else {
                    (b.id.clone(), a.id.clone())
                };
                if seen.contains(&key) {
                    continue;
                }
                let topical = cosine_similarity(ea, eb);
                if topical < self.config.topical_similarity_threshold {
                    continue;
                }
                let Some(finding) = detection::classify(&a.content, &b.content) else {
                    continue;
                };
                seen.insert(key);
                found.push(self.build(a, b, topical, finding));
            }
        }
        found
    }

    fn build(
        &self,
        a: &SemanticMemory,
        b: &SemanticMemory,
        topical: f64,
        finding: detection::Finding,
    ) -> Contradiction {
        let skew = severity::recency_skew(
            a.created_at,
            b.created_at,
            self.config.recency_horizon(),
        );
        let severity = severity::severity(topical, skew, a.evidence_quality, b.evidence_quality);
        Contradiction {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: a.project_id.clone(),
            memory_id_a: a.id.clone(),
            memory_id_b: b.id.clone(),
            contradiction_type: finding.contradiction_type,
            severity,
            recommended_resolution: resolution::recommend(severity, &self.config, a, b),
            status: resolution::initial_status(severity, &self.config),
            description: finding.description,
            detected_at: Utc::now(),
            resolved_at: None,
            resolution_applied: None,
        }
    }

    /// Supersede the loser of `contradiction`, re-reading both memories so
    /// the decision uses current versions and states. Updates the
    /// contradiction's status in place.
    ///
    /// Errors only when a participant is missing.
    pub fn resolve(&self, contradiction: &mut Contradiction) -> SomnusResult<ResolutionOutcome> {
        let a = self.load(contradiction, &contradiction.memory_id_a)?;
        let b = self.load(contradiction, &contradiction.memory_id_b)?;

        if a.lifecycle_state.is_in_flux() || b.lifecycle_state.is_in_flux() {
            debug!(contradiction_id = %contradiction.id, "participant in flux, deferring");
            contradiction.status = ContradictionStatus::Deferred;
            return Ok(ResolutionOutcome::Deferred);
        }

        let decision = resolution::pick_winner(&a, &b);
        contradiction.recommended_resolution = decision;
        let (winner, mut loser) = match decision {
            Resolution::PreferB => (b, a),
            _ => (a, b),
        };

        if !winner.is_active() {
            contradiction.status = ContradictionStatus::NeedsReview;
            contradiction.recommended_resolution = Resolution::NeedsReview;
            return Ok(ResolutionOutcome::Escalated);
        }
        if !loser.is_active() {
            // Already superseded by an earlier resolution.
            self.mark_resolved(contradiction, decision);
            return Ok(ResolutionOutcome::Applied {
                resolution: decision,
                superseded: loser.id,
            });
        }

        let expected = loser.version;
        loser.transition_to(LifecycleState::Superseded)?;
        loser.superseded_by = Some(winner.id.clone());
        loser.labile_until = None;
        loser.version = expected + 1;

        match self.memories.compare_and_swap(&loser, expected) {
            Ok(true) => {
                events::memory_superseded(&loser.id, &winner.id);
                self.mark_resolved(contradiction, decision);
                Ok(ResolutionOutcome::Applied {
                    resolution: decision,
                    superseded: loser.id,
                })
            }
            Ok(false) => {
                warn!(
                    memory_id = %loser.id,
                    expected_version = expected,
                    "version changed under resolution, deferring"
                );
                contradiction.status = ContradictionStatus::Deferred;
                Ok(ResolutionOutcome::Deferred)
            }
            Err(e) => {
                error!(memory_id = %loser.id, error = %e, "supersede write failed");
                contradiction.status = ContradictionStatus::ResolutionFailed;
                Ok(ResolutionOutcome::Failed)
            }
        }
    }

    fn mark_resolved(&self, contradiction: &mut Contradiction, decision: Resolution) {
        contradiction.status = ContradictionStatus::AutoResolved;
        contradiction.resolved_at = Some(Utc::now());
        contradiction.resolution_applied = Some(decision);
    }

    fn load(&self, contradiction: &Contradiction, memory_id: &str) -> SomnusResult<SemanticMemory> {
        self.memories.get(memory_id)?.ok_or_else(|| {
            ValidationError::MissingMemory {
                contradiction_id: contradiction.id.clone(),
                memory_id: memory_id.to_string(),
            }
            .into()
        })
    }

    /// Full contradiction phase for one run: retry deferred contradictions,
    /// detect new ones, apply the severity policy, record them.
    ///
    /// With `dry_run`, nothing is written and auto-resolvable contradictions
    /// are counted as resolved or deferred from the states in the given
    /// slices.
    pub fn run(
        &self,
        project_id: &str,
        new: &[SemanticMemory],
        existing: &[SemanticMemory],
        dry_run: bool,
    ) -> ContradictionReport {
        let mut report = ContradictionReport::default();
        if !dry_run {
            self.retry_deferred(project_id, &mut report);
        }

        let by_id: HashMap<&str, &SemanticMemory> = new
            .iter()
            .chain(existing.iter())
            .map(|m| (m.id.as_str(), m))
            .collect();

        for mut c in self.detect(new, existing) {
            match self.store.find_pair(&c.memory_id_a, &c.memory_id_b) {
                Ok(Some(_)) => continue,
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "contradiction lookup failed");
                    report.persistence_failures += 1;
                    continue;
                }
            }
            report.detected += 1;
            events::contradiction_detected(
                &c.memory_id_a,
                &c.memory_id_b,
                c.contradiction_type.as_str(),
                c.severity,
            );

            if resolution::is_auto_resolvable(c.severity, &self.config) {
                if dry_run {
                    let in_flux = [&c.memory_id_a, &c.memory_id_b].iter().any(|id| {
                        by_id
                            .get(id.as_str())
                            .is_some_and(|m| m.lifecycle_state.is_in_flux())
                    });
                    if in_flux {
                        report.deferred += 1;
                    } else {
                        report.resolved += 1;
                    }
                    continue;
                }
                match self.resolve(&mut c) {
                    Ok(outcome) => tally(&mut report, outcome),
                    Err(e) if e.kind() == ErrorKind::ValidationFailure => {
                        error!(contradiction_id = %c.id, error = %e, "dropping contradiction");
                        report.validation_failures += 1;
                        continue;
                    }
                    Err(e) => {
                        error!(contradiction_id = %c.id, error = %e, "resolution failed");
                        c.status = ContradictionStatus::ResolutionFailed;
                        report.persistence_failures += 1;
                    }
                }
            } else if c.status == ContradictionStatus::NeedsReview {
                report.needing_review += 1;
            } else {
                report.audit_only += 1;
            }

            if !dry_run {
                if let Err(e) = self.store.record(&c) {
                    error!(contradiction_id = %c.id, error = %e, "failed to record contradiction");
                    report.persistence_failures += 1;
                }
            }
        }

        if report.detected > 0 || report.resolved > 0 {
            info!(
                project_id,
                detected = report.detected,
                resolved = report.resolved,
                deferred = report.deferred,
                needing_review = report.needing_review,
                "contradiction phase finished"
            );
        }
        report
    }

    fn retry_deferred(&self, project_id: &str, report: &mut ContradictionReport) {
        let deferred = match self
            .store
            .list_by_status(project_id, ContradictionStatus::Deferred)
        {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "could not load deferred contradictions");
                report.persistence_failures += 1;
                return;
            }
        };
        for mut c in deferred {
            match self.resolve(&mut c) {
                Ok(ResolutionOutcome::Deferred) => {
                    report.deferred += 1;
                    continue;
                }
                Ok(outcome) => tally(report, outcome),
                Err(e) => {
                    if e.kind() == ErrorKind::ValidationFailure {
                        error!(contradiction_id = %c.id, error = %e, "deferred contradiction is invalid");
                        report.validation_failures += 1;
                    } else {
                        report.persistence_failures += 1;
                    }
                    c.status = ContradictionStatus::ResolutionFailed;
                }
            }
            if let Err(e) = self.store.update(&c) {
                error!(contradiction_id = %c.id, error = %e, "failed to update contradiction");
                report.persistence_failures += 1;
            }
        }
    }

    /// Contradictions waiting for a human.
    pub fn needs_review(&self, project_id: &str) -> SomnusResult<Vec<Contradiction>> {
        self.store
            .list_by_status(project_id, ContradictionStatus::NeedsReview)
    }
}

fn tally(report: &mut ContradictionReport, outcome: ResolutionOutcome) {
    match outcome {
        ResolutionOutcome::Applied { superseded, .. } => {
            report.resolved += 1;
            report.superseded.push(superseded);
        }
        ResolutionOutcome::Deferred => report.deferred += 1,
        ResolutionOutcome::Escalated => report.needing_review += 1,
        ResolutionOutcome::Failed => report.persistence_failures += 1,
    }
}
