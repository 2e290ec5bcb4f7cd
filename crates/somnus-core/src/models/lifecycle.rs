use serde::{Deserialize, Serialize};

/// Lifecycle of a semantic memory.
///
/// ```text
/// unconsolidated → consolidating → consolidated ⇄ labile → reconsolidating → consolidated
///                                          ↓
///                                     superseded (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Unconsolidated,
    Consolidating,
    Consolidated,
    /// Open to revision until `labile_until`.
    Labile,
    /// Claimed by a batch run that is closing the labile window.
    Reconsolidating,
    /// Replaced by a newer memory. Immutable.
    Superseded,
}

impl LifecycleState {
    /// Whether `self → next` is an edge of the state machine.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        match (self, next) {
            (Superseded, _) => false,
            (_, Superseded) => true,
            (Unconsolidated, Consolidating)
            | (Consolidating, Consolidated)
            | (Consolidated, Labile)
            | (Labile, Reconsolidating)
            | (Reconsolidating, Consolidated) => true,
            _ => false,
        }
    }

    /// Not superseded; visible to retrieval and contradiction detection.
    pub fn is_active(self) -> bool {
        self != LifecycleState::Superseded
    }

    /// Open to revision, so off limits for contradiction resolution.
    pub fn is_in_flux(self) -> bool {
        matches!(self, LifecycleState::Labile | LifecycleState::Reconsolidating)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Unconsolidated => "unconsolidated",
            LifecycleState::Consolidating => "consolidating",
            LifecycleState::Consolidated => "consolidated",
            LifecycleState::Labile => "labile",
            LifecycleState::Reconsolidating => "reconsolidating",
            LifecycleState::Superseded => "superseded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unconsolidated" => Some(LifecycleState::Unconsolidated),
            "consolidating" => Some(LifecycleState::Consolidating),
            "consolidated" => Some(LifecycleState::Consolidated),
            "labile" => Some(LifecycleState::Labile),
            "reconsolidating" => Some(LifecycleState::Reconsolidating),
            "superseded" => Some(LifecycleState::Superseded),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LifecycleState::*;

    #[test]
    fn forward_path_is_allowed() {
        assert!(Unconsolidated.can_transition_to(Consolidating));
        assert!(Consolidating.can_transition_to(Consolidated));
        assert!(Consolidated.can_transition_to(Labile));
        assert!(Labile.can_transition_to(Reconsolidating));
        assert!(Reconsolidating.can_transition_to(Consolidated));
    }

    #[test]
    fn superseded_is_terminal() {
        for s in [
            Unconsolidated,
            Consolidating,
            Consolidated,
            Labile,
            Reconsolidating,
            Superseded,
        ] {
            assert!(!Superseded.can_transition_to(s));
        }
        assert!(Labile.can_transition_to(Superseded));
    }

    #[test]
    fn shortcuts_are_rejected() {
        assert!(!Consolidated.can_transition_to(Reconsolidating));
        assert!(!Labile.can_transition_to(Labile));
        assert!(!Unconsolidated.can_transition_to(Consolidated));
    }
}
