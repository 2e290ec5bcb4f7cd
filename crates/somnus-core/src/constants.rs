/// Somnus system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Evidence quality assigned when an event cannot be scored.
pub const FALLBACK_EVIDENCE_QUALITY: f64 = 0.5;

/// Explicit confidence assumed when an event carries none.
pub const DEFAULT_EXPLICIT_CONFIDENCE: f64 = 0.5;

/// Activation count at which the activation signal saturates.
pub const ACTIVATION_SATURATION: u64 = 10;

/// Number of run reports kept in the engine's history.
pub const MAX_RUN_HISTORY: usize = 64;

/// Context key carrying the session identifier of an event.
pub const CONTEXT_SESSION_ID: &str = "session_id";
/// Context key carrying an explicit confidence value.
pub const CONTEXT_CONFIDENCE: &str = "confidence";
/// Context key carrying how often the event's subject was activated.
pub const CONTEXT_ACTIVATION_COUNT: &str = "activation_count";
/// Context key carrying an explicit outcome label.
pub const CONTEXT_OUTCOME: &str = "outcome";
/// Context key naming an external source.
pub const CONTEXT_SOURCE: &str = "source";
