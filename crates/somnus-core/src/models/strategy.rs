use serde::{Deserialize, Serialize};

/// How eagerly a run escalates clusters to the slow reasoning path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationStrategy {
    /// Escalate only low-confidence clusters.
    #[default]
    Balanced,
    /// Never call the reasoner.
    HeuristicOnly,
    /// Escalate every cluster that meets the support gate.
    Thorough,
}
