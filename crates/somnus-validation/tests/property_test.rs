//! The detector never supersedes a labile or reconsolidating memory.

use std::sync::Arc;

use proptest::prelude::*;
use somnus_core::config::ContradictionConfig;
use somnus_core::models::LifecycleState;
use somnus_core::traits::IMemoryStore;
use somnus_storage::StorageEngine;
use somnus_validation::ContradictionDetector;
use test_fixtures::MemoryBuilder;

fn state(idx: usize) -> LifecycleState {
    [
        LifecycleState::Consolidated,
        LifecycleState::Labile,
        LifecycleState::Reconsolidating,
    ][idx]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn in_flux_memories_are_never_superseded(
        sa in 0usize..3,
        sb in 0usize..3,
        qa in 0.0f64..1.0,
        qb in 0.0f64..1.0,
        sim in 0.8f32..1.0,
    ) {
        let store = Arc::new(StorageEngine::open_in_memory().unwrap());
        let detector =
            ContradictionDetector::new(ContradictionConfig::default(), store.clone(), store.clone());

        let a = MemoryBuilder::new("a", "deploy succeeded")
            .embedding(vec![1.0, 0.0])
            .evidence_quality(qa)
            .state(state(sa))
            .build();
        let b = MemoryBuilder::new("b", "deploy failed")
            .embedding(vec![sim, (1.0 - sim * sim).max(0.0).sqrt()])
            .evidence_quality(qb)
            .state(state(sb))
            .build();
        store.insert(&a).unwrap();
        store.insert(&b).unwrap();

        detector.run("proj", &[a.clone()], &[b.clone()], false);

        for original in [&a, &b] {
            let stored = store.get(&original.id).unwrap().unwrap();
            if original.lifecycle_state.is_in_flux() {
                prop_assert_eq!(stored.lifecycle_state, original.lifecycle_state);
            }
        }
    }
}
