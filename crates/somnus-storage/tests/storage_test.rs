//! File-backed store behaviour: events, memories, pending updates and
//! contradictions survive reopen and respect their query contracts.

use chrono::{Duration, Utc};
use somnus_core::config::StorageConfig;
use somnus_core::errors::ErrorKind;
use somnus_core::models::{
    Contradiction, ContradictionStatus, ContradictionType, LifecycleState, PendingUpdate,
    Resolution,
};
use somnus_core::traits::{IContradictionStore, IEventStore, IMemoryStore};
use somnus_storage::StorageEngine;
use test_fixtures::{EventBuilder, MemoryBuilder};

fn open(dir: &tempfile::TempDir) -> StorageEngine {
    StorageEngine::open(&dir.path().join("somnus.db"), &StorageConfig::default()).unwrap()
}

fn contradiction(id: &str, a: &str, b: &str, status: ContradictionStatus) -> Contradiction {
    Contradiction {
        id: id.to_string(),
        project_id: "proj".to_string(),
        memory_id_a: a.to_string(),
        memory_id_b: b.to_string(),
        contradiction_type: ContradictionType::OutcomeConflict,
        severity: 0.5,
        recommended_resolution: Resolution::NeedsReview,
        status,
        description: "deploy outcome disagrees".to_string(),
        detected_at: Utc::now(),
        resolved_at: None,
        resolution_applied: None,
    }
}

#[test]
fn unconsolidated_query_respects_window_project_and_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);

    store
        .insert_event(&EventBuilder::new("recent", "ran migrations").minutes_ago(30).build())
        .unwrap();
    store
        .insert_event(&EventBuilder::new("old", "ran migrations").minutes_ago(60 * 48).build())
        .unwrap();
    store
        .insert_event(
            &EventBuilder::new("other", "ran migrations")
                .project("elsewhere")
                .minutes_ago(10)
                .build(),
        )
        .unwrap();
    store
        .insert_event(
            &EventBuilder::new("done", "ran migrations")
                .minutes_ago(5)
                .consolidated()
                .build(),
        )
        .unwrap();

    let events = store.get_unconsolidated("proj", Duration::hours(24)).unwrap();
    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["recent"]);
}

#[test]
fn events_come_back_in_timestamp_order_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    store
        .insert_event(&EventBuilder::new("b", "second").minutes_ago(10).session("s").build())
        .unwrap();
    store
        .insert_event(&EventBuilder::new("a", "first").minutes_ago(20).session("s").build())
        .unwrap();

    let events = store.get_unconsolidated("proj", Duration::hours(1)).unwrap();
    assert_eq!(events[0].id, "a");
    assert_eq!(events[1].id, "b");
    assert_eq!(events[0].session_id(), Some("s"));
}

#[test]
fn marking_consolidated_hides_events_from_next_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    for id in ["e1", "e2", "e3"] {
        store
            .insert_event(&EventBuilder::new(id, "lint fixed").minutes_ago(15).build())
            .unwrap();
    }
    store
        .mark_consolidated(&["e1".to_string(), "e3".to_string()])
        .unwrap();

    let remaining = store.get_unconsolidated("proj", Duration::hours(1)).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "e2");
    assert!(store.get_event("e1").unwrap().unwrap().is_consolidated());
}

#[test]
fn memory_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open(&dir);
        let memory = MemoryBuilder::new("m1", "builds are green on main")
            .embedding(vec![0.1, 0.2, 0.3])
            .sources(&["e1", "e2"])
            .build();
        store.insert(&memory).unwrap();
    }
    let store = open(&dir);
    let loaded = store.get("m1").unwrap().unwrap();
    assert_eq!(loaded.content, "builds are green on main");
    assert_eq!(loaded.embedding, Some(vec![0.1, 0.2, 0.3]));
    assert_eq!(loaded.source_event_ids, vec!["e1", "e2"]);
    assert_eq!(loaded.lifecycle_state, LifecycleState::Consolidated);
    assert_eq!(loaded.version, 1);
}

#[test]
fn memory_with_empty_sources_is_never_persisted() {
    let store = StorageEngine::open_in_memory().unwrap();
    let memory = MemoryBuilder::new("m1", "orphan").sources(&[]).build();
    let err = store.insert(&memory).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    assert!(store.get("m1").unwrap().is_none());
}

#[test]
fn compare_and_swap_checks_version() {
    let store = StorageEngine::open_in_memory().unwrap();
    let memory = MemoryBuilder::new("m1", "cache hit rate is high").build();
    store.insert(&memory).unwrap();

    let mut next = memory.clone();
    next.lifecycle_state = LifecycleState::Labile;
    next.version = 2;
    assert!(store.compare_and_swap(&next, 1).unwrap());

    // Stale writer still thinks version is 1.
    let mut stale = memory.clone();
    stale.content = "cache hit rate is low".to_string();
    stale.version = 2;
    assert!(!store.compare_and_swap(&stale, 1).unwrap());

    let stored = store.get("m1").unwrap().unwrap();
    assert_eq!(stored.content, "cache hit rate is high");
    assert_eq!(stored.lifecycle_state, LifecycleState::Labile);
    assert_eq!(stored.version, 2);
}

#[test]
fn superseded_rows_are_immutable_and_inactive() {
    let store = StorageEngine::open_in_memory().unwrap();
    let memory = MemoryBuilder::new("loser", "deploy failed").build();
    store.insert(&memory).unwrap();
    store
        .insert(&MemoryBuilder::new("winner", "deploy succeeded").build())
        .unwrap();

    let mut superseded = memory.clone();
    superseded.lifecycle_state = LifecycleState::Superseded;
    superseded.superseded_by = Some("winner".to_string());
    superseded.version = 2;
    assert!(store.compare_and_swap(&superseded, 1).unwrap());

    let mut revived = superseded.clone();
    revived.lifecycle_state = LifecycleState::Consolidated;
    revived.version = 3;
    assert!(!store.compare_and_swap(&revived, 2).unwrap());

    let active: Vec<String> = store
        .list_active("proj")
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(active, vec!["winner"]);
    let stored = store.get("loser").unwrap().unwrap();
    assert_eq!(stored.superseded_by.as_deref(), Some("winner"));
}

#[test]
fn list_by_state_filters() {
    let store = StorageEngine::open_in_memory().unwrap();
    store
        .insert(&MemoryBuilder::new("a", "x").state(LifecycleState::Labile).build())
        .unwrap();
    store.insert(&MemoryBuilder::new("b", "y").build()).unwrap();
    let labile = store.list_by_state("proj", LifecycleState::Labile).unwrap();
    assert_eq!(labile.len(), 1);
    assert_eq!(labile[0].id, "a");
}

#[test]
fn queued_updates_merge_and_clear() {
    let store = StorageEngine::open_in_memory().unwrap();
    store.insert(&MemoryBuilder::new("m1", "v1").build()).unwrap();

    let first = PendingUpdate {
        memory_id: "m1".to_string(),
        content: "v2".to_string(),
        source_event_ids: vec!["e1".to_string()],
        quality_score: 0.7,
        evidence_quality: 0.4,
        queued_at: Utc::now(),
    };
    let second = PendingUpdate {
        content: "v3".to_string(),
        source_event_ids: vec!["e1".to_string(), "e2".to_string()],
        quality_score: 0.6,
        evidence_quality: 0.9,
        queued_at: Utc::now(),
        ..first.clone()
    };
    store.queue_update(&first).unwrap();
    store.queue_update(&second).unwrap();

    let pending = store.pending_update("m1").unwrap().unwrap();
    assert_eq!(pending.content, "v3");
    assert_eq!(pending.source_event_ids, vec!["e1", "e2"]);
    assert_eq!(pending.quality_score, 0.7);
    assert_eq!(pending.evidence_quality, 0.9);

    store.clear_pending_update("m1").unwrap();
    assert!(store.pending_update("m1").unwrap().is_none());
}

#[test]
fn contradictions_are_found_in_either_order_and_listed_by_status() {
    let store = StorageEngine::open_in_memory().unwrap();
    store
        .record(&contradiction("c1", "a", "b", ContradictionStatus::NeedsReview))
        .unwrap();
    store
        .record(&contradiction("c2", "c", "d", ContradictionStatus::Deferred))
        .unwrap();

    assert_eq!(store.find_pair("b", "a").unwrap().unwrap().id, "c1");
    assert!(store.find_pair("a", "c").unwrap().is_none());

    let review = store
        .list_by_status("proj", ContradictionStatus::NeedsReview)
        .unwrap();
    assert_eq!(review.len(), 1);

    let mut resolved = store.find_pair("c", "d").unwrap().unwrap();
    resolved.status = ContradictionStatus::AutoResolved;
    resolved.resolved_at = Some(Utc::now());
    resolved.resolution_applied = Some(Resolution::PreferA);
    store.update(&resolved).unwrap();

    let deferred = store
        .list_by_status("proj", ContradictionStatus::Deferred)
        .unwrap();
    assert!(deferred.is_empty());
    let reloaded = store.find_pair("c", "d").unwrap().unwrap();
    assert!(reloaded.is_resolved());
    assert_eq!(reloaded.resolution_applied, Some(Resolution::PreferA));
}

#[test]
fn updating_unknown_contradiction_is_not_found() {
    let store = StorageEngine::open_in_memory().unwrap();
    let err = store
        .update(&contradiction("ghost", "a", "b", ContradictionStatus::Deferred))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
}
