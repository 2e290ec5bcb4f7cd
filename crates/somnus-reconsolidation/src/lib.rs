//! # somnus-reconsolidation
//!
//! Retrieval opens a labile window on a consolidated memory; the next batch
//! run closes expired windows, applies queued updates and bumps the version.
//! Both paths write through version compare-and-swap only.

pub mod activator;
pub mod window;

pub use activator::{ReconsolidationActivator, ReconsolidationReport};
