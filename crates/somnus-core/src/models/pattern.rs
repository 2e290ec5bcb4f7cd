use serde::{Deserialize, Serialize};

/// Shape of regularity a pattern describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// The same (event type, outcome) recurs.
    Frequency,
    /// Events recur on a schedule or in a fixed order in time.
    Temporal,
    /// One event explains another.
    Causal,
    /// A repeatable sequence of steps.
    Procedural,
}

impl PatternType {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternType::Frequency => "frequency",
            PatternType::Temporal => "temporal",
            PatternType::Causal => "causal",
            PatternType::Procedural => "procedural",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "frequency" => Some(PatternType::Frequency),
            "temporal" => Some(PatternType::Temporal),
            "causal" => Some(PatternType::Causal),
            "procedural" => Some(PatternType::Procedural),
            _ => None,
        }
    }
}

/// Transient precursor of a semantic memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub pattern_type: PatternType,
    pub description: String,
    /// 0.0–1.0.
    pub confidence: f64,
    /// Number of contributing events, at least 1.
    pub support: usize,
    /// Contributing event ids.
    pub evidence_refs: Vec<String>,
}
