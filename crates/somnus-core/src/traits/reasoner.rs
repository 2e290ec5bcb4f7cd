use std::time::Duration;

use crate::errors::{CollaboratorError, SomnusResult};

/// Slow-path reasoning service (typically a language model).
pub trait IReasoner: Send + Sync {
    /// Answer `prompt`, giving up after `timeout`.
    fn reason(&self, prompt: &str, timeout: Duration) -> SomnusResult<String>;

    /// Human-readable reasoner name.
    fn name(&self) -> &str;

    /// Whether the reasoner answered its last health check.
    fn is_available(&self) -> bool;

    /// Probe the service again and refresh [`is_available`](Self::is_available).
    fn health_check(&self) -> bool {
        self.is_available()
    }

    /// False only for the heuristic-only reasoner. A configured reasoner that
    /// is unavailable counts as a slow-path failure.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Reasoner used for heuristic-only operation. Never answers.
pub struct NoOpReasoner;

impl IReasoner for NoOpReasoner {
    fn reason(&self, _prompt: &str, _timeout: Duration) -> SomnusResult<String> {
        Err(CollaboratorError::Unavailable {
            collaborator: self.name().to_string(),
            reason: "no reasoner configured".to_string(),
        }
        .into())
    }

    fn name(&self) -> &str {
        "noop"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn noop_reasoner_is_unavailable() {
        let r = NoOpReasoner;
        assert!(!r.is_available());
        assert!(!r.is_configured());
        assert!(!r.health_check());
        let err = r.reason("anything", Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);
    }
}
