//! System 1: the always-on heuristic pass.
//!
//! `confidence = w_c * cohesion + w_f * min(1, support / saturation)
//! + w_e * mean(evidence quality)`, with the weights from config.

use std::collections::HashMap;

use somnus_core::config::ConsolidationConfig;
use somnus_core::models::{EpisodicEvent, EventType, Pattern, PatternType};

use super::Cluster;
use crate::algorithms::similarity::cohesion;
use crate::evidence::{markers, outcome_polarity};

#[derive(Debug, Clone, PartialEq)]
pub struct System1Output {
    pub patterns: Vec<Pattern>,
    pub confidence: f64,
    pub cohesion: f64,
    pub frequency_signal: f64,
    pub mean_evidence_quality: f64,
}

pub fn run(cluster: &Cluster, config: &ConsolidationConfig) -> System1Output {
    let texts: Vec<&str> = cluster.events.iter().map(|e| e.content.as_str()).collect();
    let embeddings: Vec<Option<&[f32]>> =
        cluster.embeddings.iter().map(|e| e.as_deref()).collect();
    let cohesion = cohesion(&texts, &embeddings);

    let support = cluster.events.len();
    let frequency_signal = (support as f64 / config.frequency_saturation.max(1) as f64).min(1.0);
    let mean_evidence_quality = if cluster.evidence.is_empty() {
        0.0
    } else {
        cluster.evidence.iter().map(|a| a.quality).sum::<f64>() / cluster.evidence.len() as f64
    };

    let confidence = (config.cohesion_weight * cohesion
        + config.frequency_weight * frequency_signal
        + config.evidence_weight * mean_evidence_quality)
        .clamp(0.0, 1.0);

    let mut patterns = frequency_patterns(&cluster.events, confidence);
    patterns.extend(causal_pattern(&cluster.events, confidence));

    System1Output {
        patterns,
        confidence,
        cohesion,
        frequency_signal,
        mean_evidence_quality,
    }
}

/// One pattern per `(event_type, outcome)` pair seen more than once,
/// in order of first appearance.
fn frequency_patterns(events: &[EpisodicEvent], confidence: f64) -> Vec<Pattern> {
    let mut groups: Vec<((EventType, Option<&'static str>), Vec<&EpisodicEvent>)> = Vec::new();
    for event in events {
        let key = (event.event_type, outcome_polarity(event).map(|p| p.as_str()));
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(event),
            None => groups.push((key, vec![event])),
        }
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(_, members)| Pattern {
            pattern_type: PatternType::Frequency,
            description: representative(&members).to_string(),
            confidence,
            support: members.len(),
            evidence_refs: members.iter().map(|e| e.id.clone()).collect(),
        })
        .collect()
}

/// Most common content among `members`; ties go to the earliest.
fn representative<'a>(members: &[&'a EpisodicEvent]) -> &'a str {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for e in members {
        *counts.entry(e.content.as_str()).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for e in members {
        let count = counts[e.content.as_str()];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((e.content.as_str(), count));
        }
    }
    best.map_or("", |(content, _)| content)
}

/// Strictly increasing timestamps and causal language in a later event:
/// the preceding event is read as its cause.
fn causal_pattern(events: &[EpisodicEvent], confidence: f64) -> Option<Pattern> {
    if events.len() < 2 || events.windows(2).any(|w| w[0].timestamp >= w[1].timestamp) {
        return None;
    }
    let k = (1..events.len()).find(|&k| markers::CAUSAL.is_match(&events[k].content))?;
    let (cause, effect) = (&events[k - 1], &events[k]);
    Some(Pattern {
        pattern_type: PatternType::Causal,
        description: format!("{} after {}", effect.content, cause.content),
        confidence,
        support: 2,
        evidence_refs: vec![cause.id.clone(), effect.id.clone()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::EvidenceInferencer;
    use chrono::Duration;
    use test_fixtures::builders::epoch;
    use test_fixtures::EventBuilder;

    fn cluster(events: Vec<EpisodicEvent>, embeddings: Vec<Option<Vec<f32>>>) -> Cluster {
        Cluster::new(0, events, embeddings, &EvidenceInferencer::new())
    }

    #[test]
    fn repeated_outcomes_form_a_frequency_pattern() {
        let t = epoch();
        let events: Vec<_> = (0..3)
            .map(|i| {
                EventBuilder::new(&format!("e{i}"), "test passed")
                    .event_type(EventType::Outcome)
                    .outcome("success")
                    .confidence(0.9)
                    .activations(4)
                    .session("s")
                    .at(t + Duration::minutes(i * 20))
                    .build()
            })
            .collect();
        let v = Some(vec![0.6, 0.8]);
        let out = run(&cluster(events, vec![v.clone(), v.clone(), v]), &ConsolidationConfig::default());

        assert!((out.cohesion - 1.0).abs() < 1e-9);
        assert!((out.frequency_signal - 0.6).abs() < 1e-9);
        assert!(out.confidence >= 0.7);
        assert_eq!(out.patterns.len(), 1);
        let p = &out.patterns[0];
        assert_eq!(p.pattern_type, PatternType::Frequency);
        assert_eq!(p.description, "test passed");
        assert_eq!(p.support, 3);
    }

    #[test]
    fn singleton_has_low_confidence_and_no_pattern() {
        let e = EventBuilder::new("e", "flaky dns lookups").build();
        let out = run(&cluster(vec![e], vec![None]), &ConsolidationConfig::default());
        assert_eq!(out.cohesion, 0.0);
        assert!(out.confidence < 0.3);
        assert!(out.patterns.is_empty());
    }

    #[test]
    fn causal_language_after_a_predecessor() {
        let t = epoch();
        let events = vec![
            EventBuilder::new("a", "raised pool size to 64").at(t).build(),
            EventBuilder::new("b", "latency dropped because of the larger pool")
                .at(t + Duration::minutes(2))
                .build(),
        ];
        let out = run(&cluster(events, vec![None, None]), &ConsolidationConfig::default());
        let causal: Vec<_> = out
            .patterns
            .iter()
            .filter(|p| p.pattern_type == PatternType::Causal)
            .collect();
        assert_eq!(causal.len(), 1);
        assert_eq!(causal[0].evidence_refs, vec!["a", "b"]);
    }

    #[test]
    fn equal_timestamps_are_not_causal() {
        let t = epoch();
        let events = vec![
            EventBuilder::new("a", "raised pool size").at(t).build(),
            EventBuilder::new("b", "latency dropped because of it").at(t).build(),
        ];
        let out = run(&cluster(events, vec![None, None]), &ConsolidationConfig::default());
        assert!(out.patterns.iter().all(|p| p.pattern_type != PatternType::Causal));
    }

    #[test]
    fn representative_prefers_majority_then_earliest() {
        let a = EventBuilder::new("a", "x").build();
        let b = EventBuilder::new("b", "y").build();
        let c = EventBuilder::new("c", "y").build();
        assert_eq!(representative(&[&a, &b, &c]), "y");
        assert_eq!(representative(&[&a, &b]), "x");
    }
}
