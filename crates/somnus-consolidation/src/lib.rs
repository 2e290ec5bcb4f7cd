//! # somnus-consolidation
//!
//! Sleep-like consolidation of episodic events into semantic memories:
//! window closing → selection → clustering → dual-process extraction →
//! abstraction → integration → persistence → contradiction pass → event
//! marking. One run per project at a time; extraction runs on a bounded
//! rayon pool.

pub mod algorithms;
pub mod clustering;
pub mod engine;
pub mod evidence;
pub mod extraction;
pub mod monitoring;
pub mod pipeline;
pub mod scheduling;

pub use clustering::EventClusterer;
pub use engine::ConsolidationEngine;
pub use evidence::{EvidenceAssessment, EvidenceInferencer};
pub use extraction::{ExtractionResult, PatternExtractor};
pub use monitoring::{ConsolidationDashboard, RunHistory};
pub use scheduling::{CancellationToken, ProjectLocks};
