//! Phase 6: Persistence. Each write commits on its own so a later failure or
//! a cancellation never undoes memories that are already durable.

use tracing::debug;

use somnus_core::errors::{ConcurrencyError, SomnusResult, StorageError};
use somnus_core::models::{LifecycleState, PendingUpdate, SemanticMemory};
use somnus_core::traits::IMemoryStore;
use somnus_observability::tracing_setup::events;
use somnus_reconsolidation::window;

use super::phase5_integration::IntegrationAction;
use crate::scheduling::Throttle;

/// Apply one integration action, yielding at throttle batch boundaries.
///
/// Returns the stored revision when an update was applied in place.
pub fn persist(
    store: &dyn IMemoryStore,
    action: &IntegrationAction,
    throttle: &mut Throttle,
) -> SomnusResult<Option<SemanticMemory>> {
    let revised = match action {
        IntegrationAction::Create(memory) => {
            store.insert(memory)?;
            events::memory_created(
                &memory.id,
                memory.pattern_type.as_str(),
                memory.quality_score,
            );
            None
        }
        IntegrationAction::Update {
            existing_id,
            update,
        } => apply_update(store, existing_id, update)?,
    };
    throttle.tick_and_yield();
    Ok(revised)
}

/// An open window takes the update at its close. A settled memory is revised
/// now with a version CAS; a lost race surfaces as a conflict so the source
/// events stay unconsolidated and the next run retries.
fn apply_update(
    store: &dyn IMemoryStore,
    existing_id: &str,
    update: &PendingUpdate,
) -> SomnusResult<Option<SemanticMemory>> {
    let target = store.get(existing_id)?.ok_or_else(|| StorageError::NotFound {
        entity: "memory",
        id: existing_id.to_string(),
    })?;
    match target.lifecycle_state {
        LifecycleState::Labile | LifecycleState::Reconsolidating => {
            store.queue_update(update)?;
            debug!(memory_id = %existing_id, "queued update for next window close");
            Ok(None)
        }
        _ => {
            let revised = window::revise(&target, update)?;
            if !store.compare_and_swap(&revised, target.version)? {
                return Err(ConcurrencyError::VersionConflict {
                    memory_id: existing_id.to_string(),
                    expected: target.version,
                }
                .into());
            }
            debug!(memory_id = %existing_id, version = revised.version, "revised memory in place");
            Ok(Some(revised))
        }
    }
}
