//! Phase 4: Abstraction. Turn an extracted pattern into a consolidated
//! semantic memory grounded in the events that support it.

use chrono::{DateTime, Utc};

use somnus_core::errors::ValidationError;
use somnus_core::models::{EvidenceType, LifecycleState, Pattern, SemanticMemory};

use crate::evidence::EvidenceAssessment;
use crate::extraction::Cluster;

/// Build the memory for `pattern`. The embedding is left empty for the
/// caller to fill.
///
/// Sources are the pattern's evidence refs in cluster order; a pattern whose
/// refs match nothing in the cluster is grounded in the whole cluster.
pub fn build_memory(
    pattern: &Pattern,
    cluster: &Cluster,
    project_id: &str,
    now: DateTime<Utc>,
) -> Result<SemanticMemory, ValidationError> {
    let mut supporting: Vec<usize> = (0..cluster.events.len())
        .filter(|&i| pattern.evidence_refs.contains(&cluster.events[i].id))
        .collect();
    if supporting.is_empty() {
        supporting = (0..cluster.events.len()).collect();
    }

    let assessments: Vec<&EvidenceAssessment> =
        supporting.iter().map(|&i| &cluster.evidence[i]).collect();
    let evidence_quality = if assessments.is_empty() {
        0.0
    } else {
        assessments.iter().map(|a| a.quality).sum::<f64>() / assessments.len() as f64
    };

    let mut memory = SemanticMemory {
        id: uuid::Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        content: pattern.description.clone(),
        embedding: None,
        quality_score: pattern.confidence.clamp(0.0, 1.0),
        evidence_type: dominant_evidence_type(&assessments),
        evidence_quality: evidence_quality.clamp(0.0, 1.0),
        source_event_ids: supporting
            .iter()
            .map(|&i| cluster.events[i].id.clone())
            .collect(),
        pattern_type: pattern.pattern_type,
        lifecycle_state: LifecycleState::Unconsolidated,
        version: 1,
        last_retrieved_at: None,
        labile_until: None,
        superseded_by: None,
        content_hash: SemanticMemory::compute_content_hash(&pattern.description),
        created_at: now,
    };
    memory.transition_to(LifecycleState::Consolidating)?;
    memory.transition_to(LifecycleState::Consolidated)?;
    memory.validate()?;
    Ok(memory)
}

/// Most frequent evidence type; ties go to the stronger type.
pub fn dominant_evidence_type(assessments: &[&EvidenceAssessment]) -> EvidenceType {
    let mut counts: Vec<(EvidenceType, usize)> = Vec::new();
    for a in assessments {
        match counts.iter_mut().find(|(t, _)| *t == a.evidence_type) {
            Some((_, n)) => *n += 1,
            None => counts.push((a.evidence_type, 1)),
        }
    }
    counts
        .into_iter()
        .max_by_key(|(t, n)| (*n, t.strength_rank()))
        .map(|(t, _)| t)
        .unwrap_or(EvidenceType::Observed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use somnus_core::models::PatternType;
    use test_fixtures::EventBuilder;

    use crate::evidence::EvidenceInferencer;

    fn cluster() -> Cluster {
        let events = vec![
            EventBuilder::new("e1", "tests passed").outcome("success").minutes_ago(30).build(),
            EventBuilder::new("e2", "tests passed").outcome("success").minutes_ago(20).build(),
            EventBuilder::new("e3", "maybe the cache is stale").minutes_ago(10).build(),
        ];
        Cluster::new(0, events, vec![None, None, None], &EvidenceInferencer::new())
    }

    fn pattern(refs: &[&str]) -> Pattern {
        Pattern {
            pattern_type: PatternType::Frequency,
            description: "tests passed".into(),
            confidence: 0.8,
            support: refs.len(),
            evidence_refs: refs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn memory_is_consolidated_at_version_one() {
        let m = build_memory(&pattern(&["e2", "e1"]), &cluster(), "proj", Utc::now()).unwrap();
        assert_eq!(m.lifecycle_state, LifecycleState::Consolidated);
        assert_eq!(m.version, 1);
        assert_eq!(m.source_event_ids, vec!["e1", "e2"]);
        assert_eq!(m.quality_score, 0.8);
        assert_eq!(m.evidence_type, EvidenceType::Observed);
        assert_eq!(m.content_hash, SemanticMemory::compute_content_hash("tests passed"));
    }

    #[test]
    fn unknown_refs_fall_back_to_whole_cluster() {
        let m = build_memory(&pattern(&["nope"]), &cluster(), "proj", Utc::now()).unwrap();
        assert_eq!(m.source_event_ids, vec!["e1", "e2", "e3"]);
    }

    #[test]
    fn ties_go_to_the_stronger_type() {
        let observed = EvidenceAssessment {
            evidence_type: EvidenceType::Observed,
            quality: 0.5,
            fallback: false,
        };
        let hypothetical = EvidenceAssessment {
            evidence_type: EvidenceType::Hypothetical,
            quality: 0.5,
            fallback: false,
        };
        assert_eq!(
            dominant_evidence_type(&[&hypothetical, &observed]),
            EvidenceType::Observed
        );
        assert_eq!(
            dominant_evidence_type(&[&hypothetical, &hypothetical, &observed]),
            EvidenceType::Hypothetical
        );
    }
}
