//! Span definitions per operation.

/// Span around one consolidation run.
#[macro_export]
macro_rules! consolidation_span {
    ($project_id:expr, $run_id:expr) => {
        tracing::info_span!("somnus.consolidation", project_id = %$project_id, run_id = %$run_id)
    };
}

/// Span around one cluster's extraction.
#[macro_export]
macro_rules! extraction_span {
    ($cluster:expr, $support:expr) => {
        tracing::debug_span!("somnus.extraction", cluster = $cluster, support = $support)
    };
}

/// Span around the contradiction phase.
#[macro_export]
macro_rules! contradiction_span {
    ($project_id:expr) => {
        tracing::info_span!("somnus.contradiction", project_id = %$project_id)
    };
}

/// Span around window closing.
#[macro_export]
macro_rules! reconsolidation_span {
    ($project_id:expr) => {
        tracing::info_span!("somnus.reconsolidation", project_id = %$project_id)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const CONSOLIDATION: &str = "somnus.consolidation";
    pub const EXTRACTION: &str = "somnus.extraction";
    pub const CONTRADICTION: &str = "somnus.contradiction";
    pub const RECONSOLIDATION: &str = "somnus.reconsolidation";
}
