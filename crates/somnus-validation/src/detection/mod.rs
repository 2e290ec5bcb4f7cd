//! Contradiction detection strategies over memory content.
//!
//! Strategies run most specific first; the first finding wins.

pub mod outcome;
pub mod subject;
pub mod value;

use somnus_core::models::ContradictionType;

/// What a strategy found about a pair of memory contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub contradiction_type: ContradictionType,
    pub description: String,
}

/// Classify a pair of contents. Both must be about the same subject.
pub fn classify(a: &str, b: &str) -> Option<Finding> {
    if !subject::same_subject(a, b) {
        return None;
    }
    if let Some(description) = outcome::detect(a, b) {
        return Some(Finding {
            contradiction_type: ContradictionType::OutcomeConflict,
            description,
        });
    }
    if let Some(description) = value::detect(a, b) {
        return Some(Finding {
            contradiction_type: ContradictionType::ValueConflict,
            description,
        });
    }
    None
}
