/// Errors from external collaborators (embedding and reasoning services).
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{collaborator} unavailable: {reason}")]
    Unavailable {
        collaborator: String,
        reason: String,
    },

    #[error("{collaborator} timed out after {timeout_ms}ms")]
    Timeout {
        collaborator: String,
        timeout_ms: u64,
    },

    #[error("malformed response from {collaborator}: {reason}")]
    MalformedResponse {
        collaborator: String,
        reason: String,
    },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
