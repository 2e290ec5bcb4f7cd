/// Optimistic-concurrency and run-exclusivity errors.
#[derive(Debug, thiserror::Error)]
pub enum ConcurrencyError {
    #[error("version conflict on memory {memory_id}: expected version {expected}")]
    VersionConflict { memory_id: String, expected: u64 },

    #[error("consolidation already running for project {project_id}")]
    RunAlreadyActive { project_id: String },
}
