use serde::{Deserialize, Serialize};

/// Epistemic classification of how a piece of knowledge was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    /// Directly observed.
    Observed,
    /// Read off indirect signals.
    Inferred,
    /// Derived from stated premises.
    Deduced,
    /// Speculative.
    Hypothetical,
    /// A lesson drawn from experience.
    Learned,
    /// Attributed to an outside source.
    External,
}

impl EvidenceType {
    pub const ALL: [EvidenceType; 6] = [
        EvidenceType::Observed,
        EvidenceType::Inferred,
        EvidenceType::Deduced,
        EvidenceType::Hypothetical,
        EvidenceType::Learned,
        EvidenceType::External,
    ];

    /// Evidential strength rank, higher is stronger. Used to break ties when
    /// summarising the evidence behind a pattern.
    pub fn strength_rank(self) -> u8 {
        match self {
            EvidenceType::Observed => 5,
            EvidenceType::Deduced => 4,
            EvidenceType::External => 3,
            EvidenceType::Learned => 2,
            EvidenceType::Inferred => 1,
            EvidenceType::Hypothetical => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EvidenceType::Observed => "observed",
            EvidenceType::Inferred => "inferred",
            EvidenceType::Deduced => "deduced",
            EvidenceType::Hypothetical => "hypothetical",
            EvidenceType::Learned => "learned",
            EvidenceType::External => "external",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}
