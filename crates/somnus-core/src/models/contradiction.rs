use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of disagreement two memories have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionType {
    /// Opposite outcomes for the same subject (success vs failure).
    OutcomeConflict,
    /// Numerically or logically incompatible claims about the same subject.
    ValueConflict,
}

impl ContradictionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContradictionType::OutcomeConflict => "outcome_conflict",
            ContradictionType::ValueConflict => "value_conflict",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "outcome_conflict" => Some(ContradictionType::OutcomeConflict),
            "value_conflict" => Some(ContradictionType::ValueConflict),
            _ => None,
        }
    }
}

/// What to do about a contradiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    PreferA,
    PreferB,
    Merge,
    ArchiveBoth,
    NeedsReview,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::PreferA => "prefer_a",
            Resolution::PreferB => "prefer_b",
            Resolution::Merge => "merge",
            Resolution::ArchiveBoth => "archive_both",
            Resolution::NeedsReview => "needs_review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "prefer_a" => Some(Resolution::PreferA),
            "prefer_b" => Some(Resolution::PreferB),
            "merge" => Some(Resolution::Merge),
            "archive_both" => Some(Resolution::ArchiveBoth),
            "needs_review" => Some(Resolution::NeedsReview),
            _ => None,
        }
    }
}

/// Where a contradiction stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionStatus {
    /// Loser superseded by the run that detected it.
    AutoResolved,
    /// Waiting for a human.
    NeedsReview,
    /// Low severity, kept for the record.
    AuditOnly,
    /// A participant was labile or reconsolidating, or the supersede write
    /// lost a version race. Retried next run.
    Deferred,
    /// The supersede write failed.
    ResolutionFailed,
}

impl ContradictionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContradictionStatus::AutoResolved => "auto_resolved",
            ContradictionStatus::NeedsReview => "needs_review",
            ContradictionStatus::AuditOnly => "audit_only",
            ContradictionStatus::Deferred => "deferred",
            ContradictionStatus::ResolutionFailed => "resolution_failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto_resolved" => Some(ContradictionStatus::AutoResolved),
            "needs_review" => Some(ContradictionStatus::NeedsReview),
            "audit_only" => Some(ContradictionStatus::AuditOnly),
            "deferred" => Some(ContradictionStatus::Deferred),
            "resolution_failed" => Some(ContradictionStatus::ResolutionFailed),
            _ => None,
        }
    }
}

/// A pairwise conflict between two semantic memories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    pub id: String,
    pub project_id: String,
    pub memory_id_a: String,
    pub memory_id_b: String,
    pub contradiction_type: ContradictionType,
    /// 0.0–1.0.
    pub severity: f64,
    pub recommended_resolution: Resolution,
    pub status: ContradictionStatus,
    pub description: String,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_applied: Option<Resolution>,
}

impl Contradiction {
    /// Whether this contradiction is about the pair `(a, b)` in either order.
    pub fn involves(&self, a: &str, b: &str) -> bool {
        (self.memory_id_a == a && self.memory_id_b == b)
            || (self.memory_id_a == b && self.memory_id_b == a)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}
