//! Property tests for clustering, System-1 scoring and abstraction.

use std::collections::BTreeSet;

use chrono::Utc;
use proptest::prelude::*;

use somnus_consolidation::clustering::EventClusterer;
use somnus_consolidation::evidence::EvidenceInferencer;
use somnus_consolidation::extraction::{system1, Cluster};
use somnus_consolidation::pipeline::phase4_abstraction;
use somnus_core::config::ConsolidationConfig;
use somnus_core::models::{EpisodicEvent, Pattern, PatternType};
use test_fixtures::{builders::epoch, EventBuilder};

fn events_from(shape: &[(i64, Option<u8>, u8)]) -> Vec<EpisodicEvent> {
    const TOPICS: [&str; 4] = [
        "deploy succeeded",
        "cache warmed",
        "lint failed on commit",
        "rotated credentials",
    ];
    shape.iter()
        .enumerate()
        .map(|(i, (minute, session, topic))| {
            let mut b = EventBuilder::new(&format!("e{i:02}"), TOPICS[*topic as usize % 4])
                .at(epoch() + chrono::Duration::minutes(*minute));
            if let Some(s) = session {
                b = b.session(&format!("s{s}"));
            }
            b.build()
        })
        .collect()
}

fn partition(events: &[EpisodicEvent], clusters: &[Vec<usize>]) -> BTreeSet<BTreeSet<String>> {
    clusters
        .iter()
        .map(|c| c.iter().map(|&i| events[i].id.clone()).collect())
        .collect()
}

fn cluster_with_confidence(n: usize, confidence: f64) -> Cluster {
    let events: Vec<EpisodicEvent> = (0..n)
        .map(|i| {
            EventBuilder::new(&format!("e{i}"), "tests passed")
                .confidence(confidence)
                .at(epoch() + chrono::Duration::minutes(i as i64))
                .build()
        })
        .collect();
    Cluster::new(0, events, vec![None; n], &EvidenceInferencer::new())
}

fn identical_cluster(n: usize) -> Cluster {
    let events: Vec<EpisodicEvent> = (0..n)
        .map(|i| {
            EventBuilder::new(&format!("e{i}"), "tests passed")
                .outcome("success")
                .at(epoch() + chrono::Duration::minutes(i as i64))
                .build()
        })
        .collect();
    Cluster::new(0, events, vec![None; n], &EvidenceInferencer::new())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn clustering_ignores_input_order(
        shape in prop::collection::vec((0i64..240, prop::option::of(0u8..3), 0u8..4), 1..20)
    ) {
        let clusterer = EventClusterer::new(&ConsolidationConfig::default());
        let events = events_from(&shape);
        let mut reversed = events.clone();
        reversed.reverse();

        let forward = clusterer.cluster(&events, &[]);
        let backward = clusterer.cluster(&reversed, &[]);
        prop_assert_eq!(partition(&events, &forward), partition(&reversed, &backward));

        let covered: usize = forward.iter().map(Vec::len).sum();
        prop_assert_eq!(covered, events.len());
        let distinct: BTreeSet<usize> = forward.iter().flatten().copied().collect();
        prop_assert_eq!(distinct.len(), events.len());
    }

    #[test]
    fn confidence_never_drops_with_more_support(n in 1usize..12) {
        let config = ConsolidationConfig::default();
        let smaller = system1::run(&identical_cluster(n), &config);
        let larger = system1::run(&identical_cluster(n + 1), &config);
        prop_assert!(larger.confidence >= smaller.confidence);
        prop_assert!((0.0..=1.0).contains(&larger.confidence));
    }

    #[test]
    fn confidence_never_drops_with_better_evidence(
        n in 1usize..8,
        low in 0.0f64..=1.0,
        bump in 0.0f64..=1.0,
    ) {
        let high = (low + bump).min(1.0);
        let config = ConsolidationConfig::default();
        let weaker = system1::run(&cluster_with_confidence(n, low), &config);
        let stronger = system1::run(&cluster_with_confidence(n, high), &config);
        prop_assert!(stronger.mean_evidence_quality >= weaker.mean_evidence_quality);
        prop_assert!(stronger.confidence >= weaker.confidence);
    }

    #[test]
    fn abstracted_memories_are_always_valid(
        n in 1usize..8,
        confidence in 0.0f64..=1.0,
        refs in prop::collection::vec(0usize..10, 0..6),
    ) {
        let cluster = identical_cluster(n);
        let pattern = Pattern {
            pattern_type: PatternType::Frequency,
            description: "tests passed".into(),
            confidence,
            support: refs.len(),
            evidence_refs: refs.iter().map(|i| format!("e{i}")).collect(),
        };
        let memory = phase4_abstraction::build_memory(&pattern, &cluster, "proj", Utc::now()).unwrap();
        prop_assert!(memory.validate().is_ok());
        prop_assert_eq!(memory.version, 1);
        let cluster_ids = cluster.event_ids();
        prop_assert!(memory.source_event_ids.iter().all(|id| cluster_ids.contains(id)));
    }
}
