//! Phase 5: Integration. A new memory that overlaps an active one at or
//! above the merge threshold, without contradicting it, revises that memory
//! instead of becoming a duplicate.

use chrono::Utc;

use somnus_core::models::{PendingUpdate, SemanticMemory};
use somnus_validation::detection;

use crate::algorithms::similarity::cosine_similarity;

/// Decision for how to integrate a new consolidated memory.
#[derive(Debug, Clone)]
pub enum IntegrationAction {
    /// Store as a new memory.
    Create(SemanticMemory),
    /// Revise an existing memory. Applied at once to a settled memory; a
    /// memory with an open window takes it when the window closes.
    Update {
        existing_id: String,
        update: PendingUpdate,
    },
}

/// Compare `new_memory` against `existing` (active memories of the same
/// project) and pick the integration action.
pub fn determine_action(
    new_memory: SemanticMemory,
    existing: &[SemanticMemory],
    merge_threshold: f64,
) -> IntegrationAction {
    let Some(new_embedding) = new_memory.embedding.as_deref() else {
        return IntegrationAction::Create(new_memory);
    };

    let mut best_match: Option<(&SemanticMemory, f64)> = None;
    for candidate in existing {
        if candidate.id == new_memory.id
            || !candidate.is_active()
            || candidate.project_id != new_memory.project_id
        {
            continue;
        }
        let Some(emb) = candidate.embedding.as_deref() else {
            continue;
        };
        let sim = cosine_similarity(new_embedding, emb);
        if best_match.map_or(true, |(_, best)| sim > best) {
            best_match = Some((candidate, sim));
        }
    }

    if let Some((target, sim)) = best_match {
        if sim >= merge_threshold
            && detection::classify(&new_memory.content, &target.content).is_none()
        {
            return IntegrationAction::Update {
                existing_id: target.id.clone(),
                update: PendingUpdate {
                    memory_id: target.id.clone(),
                    content: new_memory.content,
                    source_event_ids: new_memory.source_event_ids,
                    quality_score: new_memory.quality_score,
                    evidence_quality: new_memory.evidence_quality,
                    queued_at: Utc::now(),
                },
            };
        }
    }

    IntegrationAction::Create(new_memory)
}
