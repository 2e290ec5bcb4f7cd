use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, Utc};
use somnus_core::config::{ReconsolidationConfig, StorageConfig};
use somnus_core::errors::ErrorKind;
use somnus_core::models::{LifecycleState, PendingUpdate};
use somnus_core::traits::IMemoryStore;
use somnus_reconsolidation::ReconsolidationActivator;
use somnus_storage::StorageEngine;
use test_fixtures::MemoryBuilder;

fn setup() -> (Arc<StorageEngine>, ReconsolidationActivator) {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let activator = ReconsolidationActivator::new(&ReconsolidationConfig::default(), store.clone());
    (store, activator)
}

#[test]
fn activate_then_close_after_window_costs_two_versions() {
    let (store, activator) = setup();
    store
        .insert(&MemoryBuilder::new("m", "ci caches cargo registry").build())
        .unwrap();

    assert!(activator.activate_on_retrieval("m").unwrap());
    let labile = store.get("m").unwrap().unwrap();
    assert_eq!(labile.lifecycle_state, LifecycleState::Labile);
    assert_eq!(labile.version, 2);
    assert!(labile.last_retrieved_at.is_some());

    // Window still open: nothing to close.
    let report = activator.close_expired_windows("proj", false).unwrap();
    assert_eq!(report.closed, 0);

    let later = Utc::now() + Duration::minutes(61);
    let report = activator.close_expired_windows_at("proj", later, false).unwrap();
    assert_eq!(report.closed, 1);
    assert_eq!(report.updates_applied, 0);

    let closed = store.get("m").unwrap().unwrap();
    assert_eq!(closed.lifecycle_state, LifecycleState::Consolidated);
    assert_eq!(closed.version, 3);
    assert!(closed.labile_until.is_none());
    assert_eq!(closed.content, "ci caches cargo registry");
}

#[test]
fn activation_of_missing_memory_is_not_found() {
    let (_store, activator) = setup();
    let err = activator.activate_on_retrieval("ghost").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    assert!(err.to_string().contains("not found"));
}

#[test]
fn activation_outside_consolidated_is_a_noop() {
    let (store, activator) = setup();
    store
        .insert(
            &MemoryBuilder::new("m", "x")
                .state(LifecycleState::Labile)
                .labile_until(Utc::now() + Duration::minutes(10))
                .build(),
        )
        .unwrap();
    assert!(!activator.activate_on_retrieval("m").unwrap());
    assert_eq!(store.get("m").unwrap().unwrap().version, 1);
}

#[test]
fn concurrent_activations_open_exactly_one_window() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        StorageEngine::open(&dir.path().join("somnus.db"), &StorageConfig::default()).unwrap(),
    );
    store.insert(&MemoryBuilder::new("m", "x").build()).unwrap();
    let activator = Arc::new(ReconsolidationActivator::new(
        &ReconsolidationConfig::default(),
        store.clone(),
    ));

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let activator = Arc::clone(&activator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                activator.activate_on_retrieval("m").unwrap()
            })
        })
        .collect();
    let wins = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(wins, 1);
    let m = store.get("m").unwrap().unwrap();
    assert_eq!(m.lifecycle_state, LifecycleState::Labile);
    assert_eq!(m.version, 2);
}

#[test]
fn queued_update_is_applied_on_close() {
    let (store, activator) = setup();
    store
        .insert(
            &MemoryBuilder::new("m", "integration suite takes 3 minutes")
                .sources(&["e1"])
                .build(),
        )
        .unwrap();
    activator.activate_on_retrieval("m").unwrap();
    store
        .queue_update(&PendingUpdate {
            memory_id: "m".into(),
            content: "integration suite takes 4 minutes".into(),
            source_event_ids: vec!["e2".into()],
            quality_score: 0.95,
            evidence_quality: 0.7,
            queued_at: Utc::now(),
        })
        .unwrap();

    let report = activator
        .close_expired_windows_at("proj", Utc::now() + Duration::hours(2), false)
        .unwrap();
    assert_eq!(report.closed, 1);
    assert_eq!(report.updates_applied, 1);

    let m = store.get("m").unwrap().unwrap();
    assert_eq!(m.content, "integration suite takes 4 minutes");
    assert_eq!(m.source_event_ids, vec!["e1", "e2"]);
    assert_eq!(m.quality_score, 0.95);
    assert_eq!(m.version, 3);
    assert!(store.pending_update("m").unwrap().is_none());
}

#[test]
fn stranded_reconsolidating_memory_is_recovered() {
    let (store, activator) = setup();
    store
        .insert(
            &MemoryBuilder::new("m", "x")
                .state(LifecycleState::Reconsolidating)
                .version(5)
                .build(),
        )
        .unwrap();

    let report = activator.close_expired_windows("proj", false).unwrap();
    assert_eq!(report.recovered, 1);
    assert_eq!(report.closed, 0);
    let m = store.get("m").unwrap().unwrap();
    assert_eq!(m.lifecycle_state, LifecycleState::Consolidated);
    assert_eq!(m.version, 5);
}

#[test]
fn dry_run_counts_without_writing() {
    let (store, activator) = setup();
    store
        .insert(
            &MemoryBuilder::new("a", "x")
                .state(LifecycleState::Labile)
                .labile_until(Utc::now() - Duration::minutes(1))
                .build(),
        )
        .unwrap();
    store
        .insert(
            &MemoryBuilder::new("b", "y")
                .state(LifecycleState::Reconsolidating)
                .build(),
        )
        .unwrap();

    let report = activator.close_expired_windows("proj", true).unwrap();
    assert_eq!(report.closed, 1);
    assert_eq!(report.recovered, 1);
    assert_eq!(
        store.get("a").unwrap().unwrap().lifecycle_state,
        LifecycleState::Labile
    );
    assert_eq!(
        store.get("b").unwrap().unwrap().lifecycle_state,
        LifecycleState::Reconsolidating
    );
}

#[test]
fn other_projects_are_untouched() {
    let (store, activator) = setup();
    store
        .insert(
            &MemoryBuilder::new("m", "x")
                .project("other")
                .state(LifecycleState::Labile)
                .labile_until(Utc::now() - Duration::minutes(1))
                .build(),
        )
        .unwrap();
    let report = activator.close_expired_windows("proj", false).unwrap();
    assert_eq!(report, Default::default());
    assert_eq!(
        store.get("m").unwrap().unwrap().lifecycle_state,
        LifecycleState::Labile
    );
}
