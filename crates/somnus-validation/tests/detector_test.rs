//! Contradiction phase against a real store: severity bands, resolution,
//! deferral of in-flux memories, and idempotent recording.

use std::sync::Arc;

use chrono::{Duration, Utc};
use somnus_core::config::ContradictionConfig;
use somnus_core::models::{ContradictionStatus, ContradictionType, LifecycleState, Resolution};
use somnus_core::traits::{IContradictionStore, IMemoryStore};
use somnus_storage::StorageEngine;
use somnus_validation::ContradictionDetector;
use test_fixtures::MemoryBuilder;

fn setup() -> (Arc<StorageEngine>, ContradictionDetector) {
    setup_with(ContradictionConfig::default())
}

fn setup_with(config: ContradictionConfig) -> (Arc<StorageEngine>, ContradictionDetector) {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let detector = ContradictionDetector::new(config, store.clone(), store.clone());
    (store, detector)
}

/// Unit vectors with cosine similarity `sim`.
fn pair(sim: f32) -> (Vec<f32>, Vec<f32>) {
    (vec![1.0, 0.0], vec![sim, (1.0 - sim * sim).sqrt()])
}

#[test]
fn outcome_conflict_is_auto_resolved_toward_better_evidence() {
    let (store, detector) = setup();
    let (ea, eb) = pair(0.9);
    let a = MemoryBuilder::new("a", "deploy succeeded")
        .embedding(ea)
        .quality(0.8)
        .evidence_quality(0.8)
        .build();
    let b = MemoryBuilder::new("b", "deploy failed")
        .embedding(eb)
        .quality(0.5)
        .evidence_quality(0.5)
        .build();
    store.insert(&b).unwrap();
    store.insert(&a).unwrap();

    let report = detector.run("proj", &[a.clone()], &[a.clone(), b.clone()], false);
    assert_eq!(report.detected, 1);
    assert_eq!(report.resolved, 1);
    assert_eq!(report.superseded, vec!["b".to_string()]);

    let loser = store.get("b").unwrap().unwrap();
    assert_eq!(loser.lifecycle_state, LifecycleState::Superseded);
    assert_eq!(loser.superseded_by.as_deref(), Some("a"));
    assert_eq!(loser.version, 2);
    assert_eq!(
        store.get("a").unwrap().unwrap().lifecycle_state,
        LifecycleState::Consolidated
    );

    let recorded = store.find_pair("a", "b").unwrap().unwrap();
    assert_eq!(recorded.contradiction_type, ContradictionType::OutcomeConflict);
    assert!(recorded.severity > 0.6);
    assert_eq!(recorded.status, ContradictionStatus::AutoResolved);
    assert_eq!(recorded.resolution_applied, Some(Resolution::PreferA));
    assert!(recorded.resolved_at.is_some());
}

#[test]
fn labile_participant_is_deferred_then_resolved_next_run() {
    let (store, detector) = setup();
    let (ea, eb) = pair(0.95);
    let a = MemoryBuilder::new("a", "cache invalidation works")
        .embedding(ea)
        .evidence_quality(0.9)
        .build();
    let b = MemoryBuilder::new("b", "cache invalidation broke")
        .embedding(eb)
        .evidence_quality(0.4)
        .state(LifecycleState::Labile)
        .labile_until(Utc::now() + Duration::minutes(30))
        .build();
    store.insert(&a).unwrap();
    store.insert(&b).unwrap();

    let report = detector.run("proj", &[a.clone()], &[b.clone()], false);
    assert_eq!(report.detected, 1);
    assert_eq!(report.deferred, 1);
    assert_eq!(report.resolved, 0);
    assert_eq!(
        store.get("b").unwrap().unwrap().lifecycle_state,
        LifecycleState::Labile
    );
    assert_eq!(
        store.find_pair("a", "b").unwrap().unwrap().status,
        ContradictionStatus::Deferred
    );

    // Window closes: b back to consolidated at a new version.
    let mut settled = store.get("b").unwrap().unwrap();
    settled.lifecycle_state = LifecycleState::Consolidated;
    settled.labile_until = None;
    settled.version = 3;
    assert!(store.compare_and_swap(&settled, 1).unwrap());

    let report = detector.run("proj", &[], &[], false);
    assert_eq!(report.resolved, 1);
    assert_eq!(report.detected, 0);
    assert_eq!(
        store.get("b").unwrap().unwrap().lifecycle_state,
        LifecycleState::Superseded
    );
    assert_eq!(
        store.find_pair("a", "b").unwrap().unwrap().status,
        ContradictionStatus::AutoResolved
    );
}

#[test]
fn mid_severity_goes_to_review_without_state_change() {
    let (store, detector) = setup();
    let (ea, eb) = pair(0.9);
    let now = Utc::now();
    let a = MemoryBuilder::new("a", "always squash commits")
        .embedding(ea)
        .evidence_quality(1.0)
        .created_at(now)
        .build();
    let b = MemoryBuilder::new("b", "never squash commits")
        .embedding(eb)
        .evidence_quality(0.0)
        .created_at(now - Duration::days(60))
        .build();
    store.insert(&a).unwrap();
    store.insert(&b).unwrap();

    let report = detector.run("proj", &[a.clone()], &[b.clone()], false);
    assert_eq!(report.needing_review, 1);
    assert_eq!(report.resolved, 0);

    let review = detector.needs_review("proj").unwrap();
    assert_eq!(review.len(), 1);
    assert_eq!(review[0].contradiction_type, ContradictionType::ValueConflict);
    assert_eq!(review[0].recommended_resolution, Resolution::NeedsReview);
    assert!(review[0].resolved_at.is_none());
    assert_eq!(
        store.get("b").unwrap().unwrap().lifecycle_state,
        LifecycleState::Consolidated
    );
}

#[test]
fn low_severity_is_audit_only() {
    let config = ContradictionConfig {
        topical_similarity_threshold: 0.1,
        ..ContradictionConfig::default()
    };
    let (store, detector) = setup_with(config);
    let (ea, eb) = pair(0.2);
    let now = Utc::now();
    let a = MemoryBuilder::new("a", "lint passes")
        .embedding(ea)
        .evidence_quality(1.0)
        .build();
    let b = MemoryBuilder::new("b", "lint fails")
        .embedding(eb)
        .evidence_quality(0.0)
        .created_at(now - Duration::days(90))
        .build();
    store.insert(&a).unwrap();
    store.insert(&b).unwrap();

    let report = detector.run("proj", &[a.clone()], &[b.clone()], false);
    assert_eq!(report.audit_only, 1);
    let recorded = store.find_pair("a", "b").unwrap().unwrap();
    assert_eq!(recorded.status, ContradictionStatus::AuditOnly);
    assert_eq!(recorded.recommended_resolution, Resolution::Merge);
}

#[test]
fn low_topical_similarity_is_not_compared() {
    let (store, detector) = setup();
    let (ea, eb) = pair(0.5);
    let a = MemoryBuilder::new("a", "deploy succeeded").embedding(ea).build();
    let b = MemoryBuilder::new("b", "deploy failed").embedding(eb).build();
    store.insert(&a).unwrap();
    store.insert(&b).unwrap();
    assert!(detector.detect(&[a], &[b]).is_empty());
}

#[test]
fn missing_embeddings_skip_detection() {
    let (_store, detector) = setup();
    let a = MemoryBuilder::new("a", "deploy succeeded").build();
    let b = MemoryBuilder::new("b", "deploy failed").build();
    assert!(detector.detect(&[a], &[b]).is_empty());
}

#[test]
fn recorded_pairs_are_not_recorded_twice() {
    let (store, detector) = setup();
    let (ea, eb) = pair(0.9);
    let now = Utc::now();
    let a = MemoryBuilder::new("a", "always squash commits")
        .embedding(ea)
        .evidence_quality(1.0)
        .build();
    let b = MemoryBuilder::new("b", "never squash commits")
        .embedding(eb)
        .evidence_quality(0.0)
        .created_at(now - Duration::days(60))
        .build();
    store.insert(&a).unwrap();
    store.insert(&b).unwrap();

    assert_eq!(detector.run("proj", &[a.clone()], &[b.clone()], false).detected, 1);
    assert_eq!(detector.run("proj", &[b.clone()], &[a.clone()], false).detected, 0);
    assert_eq!(detector.needs_review("proj").unwrap().len(), 1);
}

#[test]
fn contradiction_with_missing_memory_is_dropped() {
    let (store, detector) = setup();
    let (ea, eb) = pair(0.9);
    let a = MemoryBuilder::new("a", "deploy succeeded")
        .embedding(ea)
        .evidence_quality(0.8)
        .build();
    // b is never persisted.
    let b = MemoryBuilder::new("b", "deploy failed")
        .embedding(eb)
        .evidence_quality(0.5)
        .build();
    store.insert(&a).unwrap();

    let report = detector.run("proj", &[a], &[b], false);
    assert_eq!(report.validation_failures, 1);
    assert!(store.find_pair("a", "b").unwrap().is_none());
}

#[test]
fn dry_run_writes_nothing() {
    let (store, detector) = setup();
    let (ea, eb) = pair(0.9);
    let a = MemoryBuilder::new("a", "deploy succeeded")
        .embedding(ea)
        .evidence_quality(0.8)
        .build();
    let b = MemoryBuilder::new("b", "deploy failed")
        .embedding(eb)
        .evidence_quality(0.5)
        .build();
    store.insert(&a).unwrap();
    store.insert(&b).unwrap();

    let report = detector.run("proj", &[a], &[b], true);
    assert_eq!(report.detected, 1);
    assert_eq!(report.resolved, 1);
    assert!(store.find_pair("a", "b").unwrap().is_none());
    assert_eq!(
        store.get("b").unwrap().unwrap().lifecycle_state,
        LifecycleState::Consolidated
    );
}
