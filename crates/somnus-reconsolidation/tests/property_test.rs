//! Version accounting over arbitrary interleavings of retrieval and batch
//! closes.

use std::sync::Arc;

use chrono::{Duration, Utc};
use proptest::prelude::*;
use somnus_core::config::ReconsolidationConfig;
use somnus_core::models::LifecycleState;
use somnus_core::traits::IMemoryStore;
use somnus_reconsolidation::ReconsolidationActivator;
use somnus_storage::StorageEngine;
use test_fixtures::MemoryBuilder;

#[derive(Debug, Clone, Copy)]
enum Op {
    Retrieve,
    CloseEarly,
    CloseLate,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Retrieve), Just(Op::CloseEarly), Just(Op::CloseLate)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn each_window_costs_exactly_two_versions(ops in prop::collection::vec(op(), 1..20)) {
        let store = Arc::new(StorageEngine::open_in_memory().unwrap());
        store.insert(&MemoryBuilder::new("m", "x").build()).unwrap();
        let activator =
            ReconsolidationActivator::new(&ReconsolidationConfig::default(), store.clone());

        let mut expected_version = 1u64;
        let mut labile = false;
        for op in ops {
            match op {
                Op::Retrieve => {
                    let opened = activator.activate_on_retrieval("m").unwrap();
                    prop_assert_eq!(opened, !labile);
                    if opened {
                        expected_version += 1;
                        labile = true;
                    }
                }
                Op::CloseEarly => {
                    let report = activator.close_expired_windows("proj", false).unwrap();
                    prop_assert_eq!(report.closed, 0);
                }
                Op::CloseLate => {
                    let later = Utc::now() + Duration::hours(2);
                    let report = activator.close_expired_windows_at("proj", later, false).unwrap();
                    prop_assert_eq!(report.closed, usize::from(labile));
                    if labile {
                        expected_version += 1;
                        labile = false;
                    }
                }
            }
            let m = store.get("m").unwrap().unwrap();
            prop_assert_eq!(m.version, expected_version);
            let state = if labile { LifecycleState::Labile } else { LifecycleState::Consolidated };
            prop_assert_eq!(m.lifecycle_state, state);
        }
    }
}
