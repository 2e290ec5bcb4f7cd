//! Resolution policy: which memory wins, and what a severity band means.

use somnus_core::config::ContradictionConfig;
use somnus_core::models::{ContradictionStatus, Resolution, SemanticMemory};

/// Higher `evidence_quality` wins; ties go to the more recent `created_at`,
/// then to `a`.
pub fn pick_winner(a: &SemanticMemory, b: &SemanticMemory) -> Resolution {
    if (a.evidence_quality - b.evidence_quality).abs() > 1e-9 {
        if a.evidence_quality > b.evidence_quality {
            Resolution::PreferA
        } else {
            Resolution::PreferB
        }
    } else if b.created_at > a.created_at {
        Resolution::PreferB
    } else {
        Resolution::PreferA
    }
}

/// Strictly above the threshold: a severity exactly at it goes to review.
pub fn is_auto_resolvable(severity: f64, config: &ContradictionConfig) -> bool {
    severity > config.auto_resolve_severity
}

/// Recommended resolution for a severity band.
pub fn recommend(
    severity: f64,
    config: &ContradictionConfig,
    a: &SemanticMemory,
    b: &SemanticMemory,
) -> Resolution {
    if is_auto_resolvable(severity, config) {
        pick_winner(a, b)
    } else if severity >= config.review_severity {
        Resolution::NeedsReview
    } else {
        Resolution::Merge
    }
}

/// Status before any resolution attempt. Auto-resolvable contradictions
/// start `Deferred` until the supersede write lands.
pub fn initial_status(severity: f64, config: &ContradictionConfig) -> ContradictionStatus {
    if is_auto_resolvable(severity, config) {
        ContradictionStatus::Deferred
    } else if severity >= config.review_severity {
        ContradictionStatus::NeedsReview
    } else {
        ContradictionStatus::AuditOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use test_fixtures::MemoryBuilder;

    #[test]
    fn higher_evidence_quality_wins() {
        let a = MemoryBuilder::new("a", "x").evidence_quality(0.8).build();
        let b = MemoryBuilder::new("b", "y").evidence_quality(0.5).build();
        assert_eq!(pick_winner(&a, &b), Resolution::PreferA);
        assert_eq!(pick_winner(&b, &a), Resolution::PreferB);
    }

    #[test]
    fn ties_go_to_the_newer_memory() {
        let now = Utc::now();
        let a = MemoryBuilder::new("a", "x")
            .created_at(now - Duration::days(2))
            .build();
        let b = MemoryBuilder::new("b", "y").created_at(now).build();
        assert_eq!(pick_winner(&a, &b), Resolution::PreferB);
    }

    #[test]
    fn bands() {
        let config = ContradictionConfig::default();
        assert_eq!(initial_status(0.61, &config), ContradictionStatus::Deferred);
        assert_eq!(initial_status(0.45, &config), ContradictionStatus::NeedsReview);
        assert_eq!(initial_status(0.1, &config), ContradictionStatus::AuditOnly);
    }

    #[test]
    fn band_edges() {
        let config = ContradictionConfig::default();
        assert!(!is_auto_resolvable(0.6, &config));
        assert!(is_auto_resolvable(0.600_001, &config));
        assert_eq!(initial_status(0.6, &config), ContradictionStatus::NeedsReview);
        assert_eq!(initial_status(0.3, &config), ContradictionStatus::NeedsReview);
        assert_eq!(initial_status(0.299, &config), ContradictionStatus::AuditOnly);

        let a = MemoryBuilder::new("a", "x").build();
        let b = MemoryBuilder::new("b", "y").build();
        assert_eq!(recommend(0.6, &config, &a, &b), Resolution::NeedsReview);
    }
}
