//! # somnus-core
//!
//! Foundation crate for the Somnus consolidation engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod similarity;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::SomnusConfig;
pub use errors::{ErrorKind, SomnusError, SomnusResult};
pub use models::{
    ConsolidationState, ConsolidationStrategy, Contradiction, EpisodicEvent, EventType,
    EvidenceType, LifecycleState, Pattern, PatternType, RunReport, SemanticMemory,
};
