//! PatternExtractor: dual-process pattern extraction for one cluster.
//!
//! System 1 always runs. A cluster escalates to System 2 when a reasoner is
//! configured, the strategy allows it, support meets the slow-path gate,
//! and (for the balanced strategy) System-1 confidence is below
//! `min_pattern_confidence`. A System-2 failure, including a configured
//! reasoner that failed its health check, falls back to System 1 and marks
//! the run degraded. Clusters below the discard floor keep no patterns.

pub mod system1;
pub mod system2;

use std::sync::Arc;

use tracing::{debug, warn};

use somnus_core::config::{ConsolidationConfig, SlowPathConfig};
use somnus_core::models::{ConsolidationStrategy, EpisodicEvent, Pattern};
use somnus_core::traits::IReasoner;

use crate::evidence::{EvidenceAssessment, EvidenceInferencer};
use system2::{ReasonerWorkers, SlowPathAction};

/// A cluster ready for extraction. All vectors are parallel to `events`.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Position in the run's cluster list.
    pub index: usize,
    pub events: Vec<EpisodicEvent>,
    pub embeddings: Vec<Option<Vec<f32>>>,
    pub evidence: Vec<EvidenceAssessment>,
}

impl Cluster {
    pub fn new(
        index: usize,
        events: Vec<EpisodicEvent>,
        embeddings: Vec<Option<Vec<f32>>>,
        inferencer: &EvidenceInferencer,
    ) -> Self {
        let evidence = events.iter().map(|e| inferencer.infer(e)).collect();
        Self {
            index,
            events,
            embeddings,
            evidence,
        }
    }

    pub fn support(&self) -> usize {
        self.events.len()
    }

    pub fn event_ids(&self) -> Vec<String> {
        self.events.iter().map(|e| e.id.clone()).collect()
    }
}

/// What extraction produced for one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub cluster_index: usize,
    /// Patterns to store. Empty when discarded or when nothing was found.
    pub patterns: Vec<Pattern>,
    /// Final cluster confidence after any escalation.
    pub confidence: f64,
    /// System 2 answered and its output was used.
    pub used_slow_path: bool,
    /// System 2 was attempted and failed.
    pub slow_path_error: Option<String>,
    /// Confidence fell below the discard floor.
    pub discarded: bool,
}

pub struct PatternExtractor {
    consolidation: ConsolidationConfig,
    slow_path: SlowPathConfig,
    reasoner: Arc<dyn IReasoner>,
    /// Allows one abandoned call per extraction slot on top of the live ones.
    workers: ReasonerWorkers,
}

impl PatternExtractor {
    pub fn new(
        consolidation: ConsolidationConfig,
        slow_path: SlowPathConfig,
        reasoner: Arc<dyn IReasoner>,
    ) -> Self {
        Self {
            workers: ReasonerWorkers::new(slow_path.concurrency * 2),
            consolidation,
            slow_path,
            reasoner,
        }
    }

    /// Re-probe the reasoner. Called once per run so a reasoner that comes
    /// back is picked up without rebuilding the engine.
    pub fn refresh_reasoner(&self) -> bool {
        if !self.reasoner.is_configured() {
            return false;
        }
        let available = self.reasoner.health_check();
        if !available {
            warn!(reasoner = self.reasoner.name(), "reasoner failed its health check");
        }
        available
    }

    fn should_escalate(&self, strategy: ConsolidationStrategy, cluster: &Cluster, confidence: f64) -> bool {
        if cluster.support() < self.slow_path.min_support || !self.reasoner.is_configured() {
            return false;
        }
        match strategy {
            ConsolidationStrategy::HeuristicOnly => false,
            ConsolidationStrategy::Thorough => true,
            ConsolidationStrategy::Balanced => {
                confidence < self.consolidation.min_pattern_confidence
            }
        }
    }

    pub fn extract(&self, cluster: &Cluster, strategy: ConsolidationStrategy) -> ExtractionResult {
        let s1 = system1::run(cluster, &self.consolidation);
        let mut patterns = s1.patterns;
        let mut confidence = s1.confidence;
        let mut used_slow_path = false;
        let mut slow_path_error = None;

        let escalate = self.should_escalate(strategy, cluster, confidence);
        if escalate && !self.reasoner.is_available() {
            warn!(cluster = cluster.index, reasoner = self.reasoner.name(), "reasoner unavailable, keeping heuristic output");
            slow_path_error = Some(format!("{} unavailable", self.reasoner.name()));
        } else if escalate {
            debug!(cluster = cluster.index, confidence, "escalating to slow path");
            let prompt = system2::build_prompt(cluster, &patterns, confidence);
            match system2::reason(
                &self.workers,
                &self.reasoner,
                &prompt,
                &cluster.event_ids(),
                &self.slow_path,
            ) {
                Ok(reply) => {
                    used_slow_path = true;
                    confidence = confidence.max(reply.confidence);
                    match reply.action {
                        SlowPathAction::Replace => patterns = reply.patterns,
                        SlowPathAction::Augment => {
                            for p in &mut patterns {
                                p.confidence = confidence;
                            }
                            for p in reply.patterns {
                                if !patterns.iter().any(|q| q.description == p.description) {
                                    patterns.push(p);
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(cluster = cluster.index, error = %e, "slow path failed, keeping heuristic output");
                    slow_path_error = Some(e.to_string());
                }
            }
        }

        let floor = self.consolidation.discard_confidence_floor;
        let discarded = confidence < floor;
        if discarded {
            debug!(cluster = cluster.index, confidence, "below discard floor");
            patterns.clear();
        } else {
            patterns.retain(|p| p.confidence >= floor);
        }

        ExtractionResult {
            cluster_index: cluster.index,
            patterns,
            confidence,
            used_slow_path,
            slow_path_error,
            discarded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use somnus_core::models::{EventType, PatternType};
    use somnus_core::traits::NoOpReasoner;
    use test_fixtures::builders::epoch;
    use test_fixtures::{EventBuilder, FailingReasoner, OfflineReasoner, ScriptedReasoner};

    fn extractor(reasoner: Arc<dyn IReasoner>) -> PatternExtractor {
        PatternExtractor::new(
            ConsolidationConfig::default(),
            SlowPathConfig {
                timeout_seconds: 1,
                max_retries: 0,
                backoff_ms: 0,
                ..SlowPathConfig::default()
            },
            reasoner,
        )
    }

    fn pair_cluster() -> Cluster {
        let t = epoch();
        let events = vec![
            EventBuilder::new("a", "cache warmed before switch")
                .event_type(EventType::Action)
                .at(t)
                .build(),
            EventBuilder::new("b", "cache warmed before switch")
                .event_type(EventType::Action)
                .at(t + Duration::minutes(1))
                .build(),
        ];
        Cluster::new(0, events, vec![None, None], &EvidenceInferencer::new())
    }

    #[test]
    fn heuristic_only_never_calls_the_reasoner() {
        let reasoner = Arc::new(ScriptedReasoner::new("{}"));
        let result = extractor(reasoner.clone()).extract(&pair_cluster(), ConsolidationStrategy::HeuristicOnly);
        assert_eq!(reasoner.call_count(), 0);
        assert!(!result.used_slow_path);
    }

    #[test]
    fn unavailable_reasoner_is_not_a_failure() {
        let result = extractor(Arc::new(NoOpReasoner)).extract(&pair_cluster(), ConsolidationStrategy::Thorough);
        assert!(!result.used_slow_path);
        assert!(result.slow_path_error.is_none());
    }

    #[test]
    fn replace_reply_supersedes_heuristic_patterns() {
        let reasoner = Arc::new(ScriptedReasoner::new(
            r#"{"action": "replace", "confidence": 0.9, "patterns": [
                {"pattern_type": "procedural", "description": "warm the cache before every traffic switch", "evidence_refs": ["a", "b"]}
            ]}"#,
        ));
        let result = extractor(reasoner.clone()).extract(&pair_cluster(), ConsolidationStrategy::Balanced);
        assert_eq!(reasoner.call_count(), 1);
        assert!(result.used_slow_path);
        assert!((result.confidence - 0.9).abs() < 1e-9);
        assert_eq!(result.patterns.len(), 1);
        assert_eq!(result.patterns[0].pattern_type, PatternType::Procedural);
    }

    #[test]
    fn augment_reply_keeps_heuristic_patterns() {
        let reasoner = Arc::new(ScriptedReasoner::new(
            r#"{"action": "augment", "confidence": 0.8, "patterns": [
                {"pattern_type": "procedural", "description": "warm the cache first"}
            ]}"#,
        ));
        let result = extractor(reasoner).extract(&pair_cluster(), ConsolidationStrategy::Thorough);
        assert_eq!(result.patterns.len(), 2);
        assert_eq!(result.patterns[0].pattern_type, PatternType::Frequency);
        assert!((result.patterns[0].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn configured_but_unreachable_reasoner_is_a_failure() {
        let reasoner = Arc::new(OfflineReasoner::new("{}"));
        let extractor = extractor(reasoner.clone());
        assert!(!extractor.refresh_reasoner());
        let result = extractor.extract(&pair_cluster(), ConsolidationStrategy::Thorough);
        assert_eq!(reasoner.call_count(), 0);
        assert!(!result.used_slow_path);
        assert_eq!(result.slow_path_error.as_deref(), Some("offline unavailable"));
        assert_eq!(result.patterns.len(), 1);
    }

    #[test]
    fn reasoner_coming_back_is_used_after_refresh() {
        let reasoner = Arc::new(OfflineReasoner::new(
            r#"{"action": "augment", "confidence": 0.85, "patterns": []}"#,
        ));
        let extractor = extractor(reasoner.clone());
        assert!(!extractor.refresh_reasoner());

        reasoner.set_online(true);
        assert!(extractor.refresh_reasoner());
        let result = extractor.extract(&pair_cluster(), ConsolidationStrategy::Thorough);
        assert_eq!(reasoner.call_count(), 1);
        assert!(result.used_slow_path);
        assert!(result.slow_path_error.is_none());
    }

    #[test]
    fn failed_slow_path_keeps_system1_output() {
        let reasoner = Arc::new(FailingReasoner::default());
        let result = extractor(reasoner.clone()).extract(&pair_cluster(), ConsolidationStrategy::Balanced);
        assert_eq!(reasoner.call_count(), 1);
        assert!(!result.used_slow_path);
        assert!(result.slow_path_error.is_some());
        assert_eq!(result.patterns.len(), 1);
        assert_eq!(result.patterns[0].pattern_type, PatternType::Frequency);
    }

    #[test]
    fn low_confidence_cluster_is_discarded() {
        let event = EventBuilder::new("solo", "noticed flaky dns lookups").build();
        let cluster = Cluster::new(0, vec![event], vec![None], &EvidenceInferencer::new());
        let result = extractor(Arc::new(NoOpReasoner)).extract(&cluster, ConsolidationStrategy::Balanced);
        assert!(result.discarded);
        assert!(result.patterns.is_empty());
    }
}
