//! # somnus-observability
//!
//! Structured tracing setup, span macros, key-event helpers, and degradation
//! tracking for consolidation runs.

pub mod degradation;
pub mod tracing_setup;

pub use degradation::{DegradationEvent, DegradationTracker};
pub use tracing_setup::{init_from_config, init_tracing, init_tracing_with_filter};
