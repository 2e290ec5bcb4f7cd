//! Error taxonomy for the consolidation engine.
//!
//! Each subsystem has its own error enum; [`SomnusError`] wraps them all.
//! [`SomnusError::kind`] maps any error onto the recovery class the
//! orchestrator acts on.

mod collaborator_error;
mod concurrency_error;
mod config_error;
mod storage_error;
mod validation_error;

pub use collaborator_error::CollaboratorError;
pub use concurrency_error::ConcurrencyError;
pub use config_error::ConfigError;
pub use storage_error::StorageError;
pub use validation_error::ValidationError;

/// Convenience alias used across the workspace.
pub type SomnusResult<T> = Result<T, SomnusError>;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum SomnusError {
    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("collaborator error: {0}")]
    CollaboratorError(#[from] CollaboratorError),

    #[error("concurrency error: {0}")]
    ConcurrencyError(#[from] ConcurrencyError),

    #[error("validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Recovery class of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Embedding or reasoning service down. Degrade to a cheaper signal.
    CollaboratorUnavailable,
    /// Version CAS mismatch. Skip and retry next cycle.
    ConcurrencyConflict,
    /// A write failed. Fatal to the affected item only.
    PersistenceFailure,
    /// Internal invariant violated. Drop the item and log loudly.
    ValidationFailure,
    /// Bad configuration. Fatal at construction time.
    Configuration,
}

impl SomnusError {
    /// The recovery class for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SomnusError::StorageError(_) | SomnusError::SerializationError(_) => {
                ErrorKind::PersistenceFailure
            }
            SomnusError::CollaboratorError(_) => ErrorKind::CollaboratorUnavailable,
            SomnusError::ConcurrencyError(_) => ErrorKind::ConcurrencyConflict,
            SomnusError::ValidationError(_) => ErrorKind::ValidationFailure,
            SomnusError::ConfigError(_) => ErrorKind::Configuration,
        }
    }
}
