//! # somnus-validation
//!
//! Pairwise contradiction detection between semantic memories: outcome and
//! value conflicts on a shared subject, severity scoring, and resolution that
//! supersedes the weaker memory through a version compare-and-swap.

pub mod detection;
pub mod detector;
pub mod resolution;
pub mod severity;

pub use detector::{ContradictionDetector, ContradictionReport, ResolutionOutcome};
