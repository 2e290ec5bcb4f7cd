//! EvidenceInferencer: epistemic status and quality of a single event.
//!
//! Classification is a pure first-match table over marker sets:
//! hedging → hypothetical, premise + conclusion → deduced, attribution or a
//! `source` → external, learning → learned, inference markers or a decision
//! → inferred, otherwise observed.

pub mod markers;

use serde::{Deserialize, Serialize};
use tracing::debug;

use somnus_core::constants::{
    ACTIVATION_SATURATION, DEFAULT_EXPLICIT_CONFIDENCE, FALLBACK_EVIDENCE_QUALITY,
};
use somnus_core::models::{EpisodicEvent, EventType, EvidenceType};
use somnus_validation::detection::outcome::Polarity;

const W_CONFIDENCE: f64 = 0.4;
const W_ACTIVATION: f64 = 0.3;
const W_OUTCOME: f64 = 0.2;
const W_CONSOLIDATED: f64 = 0.1;

/// Evidence type and quality of one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvidenceAssessment {
    pub evidence_type: EvidenceType,
    pub quality: f64,
    /// Input was malformed and the fallback was used.
    pub fallback: bool,
}

impl EvidenceAssessment {
    fn fallback() -> Self {
        Self {
            evidence_type: EvidenceType::Observed,
            quality: FALLBACK_EVIDENCE_QUALITY,
            fallback: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceInferencer;

impl EvidenceInferencer {
    pub fn new() -> Self {
        Self
    }

    /// Classify `event` and score its quality. Never fails: malformed input
    /// yields `(observed, 0.5)`.
    pub fn infer(&self, event: &EpisodicEvent) -> EvidenceAssessment {
        let Some(confidence) = validate(event) else {
            debug!(event_id = %event.id, "malformed event, using fallback evidence");
            return EvidenceAssessment::fallback();
        };

        let quality = W_CONFIDENCE * confidence
            + W_ACTIVATION * activation_signal(event)
            + W_OUTCOME * outcome_clarity(event)
            + W_CONSOLIDATED * if event.is_consolidated() { 1.0 } else { 0.0 };

        EvidenceAssessment {
            evidence_type: classify(event),
            quality: quality.clamp(0.0, 1.0),
            fallback: false,
        }
    }
}

/// The explicit confidence of a well-formed event, or `None` if malformed.
fn validate(event: &EpisodicEvent) -> Option<f64> {
    if event.content.trim().is_empty() {
        return None;
    }
    if !event.importance.is_finite() || !(0.0..=1.0).contains(&event.importance) {
        return None;
    }
    match event.explicit_confidence() {
        None => Some(DEFAULT_EXPLICIT_CONFIDENCE),
        Some(value) => value
            .as_f64()
            .filter(|c| c.is_finite() && (0.0..=1.0).contains(c)),
    }
}

/// First matching rule wins.
pub fn classify(event: &EpisodicEvent) -> EvidenceType {
    let text = event.content.as_str();
    if markers::HEDGING.is_match(text) {
        EvidenceType::Hypothetical
    } else if markers::PREMISE.is_match(text) && markers::CONCLUSION.is_match(text) {
        EvidenceType::Deduced
    } else if event.source().is_some() || markers::ATTRIBUTION.is_match(text) {
        EvidenceType::External
    } else if markers::LEARNING.is_match(text) {
        EvidenceType::Learned
    } else if markers::INFERENCE.is_match(text) || event.event_type == EventType::Decision {
        EvidenceType::Inferred
    } else {
        EvidenceType::Observed
    }
}

fn activation_signal(event: &EpisodicEvent) -> f64 {
    let count = event.activation_count().unwrap_or(0).min(ACTIVATION_SATURATION);
    count as f64 / ACTIVATION_SATURATION as f64
}

/// Success/failure polarity of an event, from its `outcome` label first and
/// its content second.
pub fn outcome_polarity(event: &EpisodicEvent) -> Option<Polarity> {
    event
        .outcome_label()
        .and_then(Polarity::from_label)
        .or_else(|| somnus_validation::detection::outcome::polarity(&event.content))
}

fn outcome_clarity(event: &EpisodicEvent) -> f64 {
    if outcome_polarity(event).is_some() {
        1.0
    } else if event.event_type == EventType::Outcome {
        0.5
    } else {
        0.0
    }
}
