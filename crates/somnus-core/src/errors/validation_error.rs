/// Internal invariant violations.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("memory {memory_id} has no source events")]
    EmptySourceEvents { memory_id: String },

    #[error("contradiction {contradiction_id} references missing memory {memory_id}")]
    MissingMemory {
        contradiction_id: String,
        memory_id: String,
    },

    #[error("illegal lifecycle transition for {memory_id}: {from} -> {to}")]
    IllegalTransition {
        memory_id: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("{field} out of range for {id}: {value}")]
    OutOfRange {
        id: String,
        field: &'static str,
        value: f64,
    },

    #[error("memory {memory_id} is superseded and immutable")]
    Immutable { memory_id: String },
}
