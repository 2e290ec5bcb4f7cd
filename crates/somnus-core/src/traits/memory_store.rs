use crate::errors::SomnusResult;
use crate::models::{LifecycleState, PendingUpdate, SemanticMemory};

/// Semantic memory persistence with optimistic concurrency.
pub trait IMemoryStore: Send + Sync {
    /// Insert a new memory. Each insert commits on its own.
    fn insert(&self, memory: &SemanticMemory) -> SomnusResult<()>;

    fn get(&self, id: &str) -> SomnusResult<Option<SemanticMemory>>;

    /// All non-superseded memories of a project.
    fn list_active(&self, project_id: &str) -> SomnusResult<Vec<SemanticMemory>>;

    fn list_by_state(
        &self,
        project_id: &str,
        state: LifecycleState,
    ) -> SomnusResult<Vec<SemanticMemory>>;

    /// Overwrite the stored row with `memory` only if its stored version is
    /// still `expected_version`. Returns `Ok(false)` on a version mismatch.
    fn compare_and_swap(
        &self,
        memory: &SemanticMemory,
        expected_version: u64,
    ) -> SomnusResult<bool>;

    /// Queue an update for a memory, folding it into any update already
    /// queued (see [`PendingUpdate::merge`]).
    fn queue_update(&self, update: &PendingUpdate) -> SomnusResult<()>;

    fn pending_update(&self, memory_id: &str) -> SomnusResult<Option<PendingUpdate>>;

    fn clear_pending_update(&self, memory_id: &str) -> SomnusResult<()>;
}
