//! Pure state changes for opening and closing a labile window.

use chrono::{DateTime, Duration, Utc};

use somnus_core::errors::ValidationError;
use somnus_core::models::{LifecycleState, PendingUpdate, SemanticMemory};

/// `consolidated(v) → labile(v+1)` with the window ending at `now + window`.
pub fn open(
    memory: &SemanticMemory,
    window: Duration,
    now: DateTime<Utc>,
) -> Result<SemanticMemory, ValidationError> {
    let mut next = memory.clone();
    next.transition_to(LifecycleState::Labile)?;
    next.labile_until = Some(now + window);
    next.last_retrieved_at = Some(now);
    next.version = memory.version + 1;
    Ok(next)
}

/// A labile memory whose window has run out. A missing deadline counts as
/// expired so the memory cannot stay labile forever.
pub fn is_expired(memory: &SemanticMemory, now: DateTime<Utc>) -> bool {
    memory.lifecycle_state == LifecycleState::Labile
        && memory.labile_until.map_or(true, |until| until < now)
}

/// `labile(v) → reconsolidating(v+1)`: the claim step of a window close.
pub fn claim(memory: &SemanticMemory) -> Result<SemanticMemory, ValidationError> {
    let mut next = memory.clone();
    next.transition_to(LifecycleState::Reconsolidating)?;
    next.version = memory.version + 1;
    Ok(next)
}

/// `reconsolidating(v) → consolidated(v)`, folding in `update` if one was
/// queued. The version was already bumped by the claim.
pub fn commit(
    memory: &SemanticMemory,
    update: Option<&PendingUpdate>,
) -> Result<SemanticMemory, ValidationError> {
    let mut next = memory.clone();
    next.transition_to(LifecycleState::Consolidated)?;
    next.labile_until = None;
    if let Some(update) = update {
        apply_update(&mut next, update);
    }
    Ok(next)
}

/// `consolidated(v) → consolidated(v+1)` with `update` folded in. Revisions
/// for a memory with no open window land directly instead of waiting for a
/// retrieval that may never come.
pub fn revise(
    memory: &SemanticMemory,
    update: &PendingUpdate,
) -> Result<SemanticMemory, ValidationError> {
    match memory.lifecycle_state {
        LifecycleState::Consolidated => {}
        LifecycleState::Superseded => {
            return Err(ValidationError::Immutable {
                memory_id: memory.id.clone(),
            })
        }
        other => {
            return Err(ValidationError::IllegalTransition {
                memory_id: memory.id.clone(),
                from: other.as_str(),
                to: LifecycleState::Consolidated.as_str(),
            })
        }
    }
    let mut next = memory.clone();
    apply_update(&mut next, update);
    next.version = memory.version + 1;
    Ok(next)
}

fn apply_update(memory: &mut SemanticMemory, update: &PendingUpdate) {
    if memory.content != update.content {
        memory.content = update.content.clone();
        memory.content_hash = SemanticMemory::compute_content_hash(&memory.content);
    }
    for id in &update.source_event_ids {
        if !memory.source_event_ids.contains(id) {
            memory.source_event_ids.push(id.clone());
        }
    }
    memory.quality_score = memory.quality_score.max(update.quality_score);
    memory.evidence_quality = memory.evidence_quality.max(update.evidence_quality);
}
