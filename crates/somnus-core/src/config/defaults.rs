// Single source of truth for all default values.

// --- Consolidation ---
pub const DEFAULT_TIME_WINDOW_HOURS: u64 = 24;
pub const DEFAULT_PROXIMITY_THRESHOLD_MINUTES: u64 = 5;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.75;
pub const DEFAULT_MIN_PATTERN_CONFIDENCE: f64 = 0.7;
pub const DEFAULT_DISCARD_CONFIDENCE_FLOOR: f64 = 0.3;
pub const DEFAULT_MERGE_SIMILARITY_THRESHOLD: f64 = 0.92;
pub const DEFAULT_FREQUENCY_SATURATION: usize = 5;
pub const DEFAULT_COHESION_WEIGHT: f64 = 0.5;
pub const DEFAULT_FREQUENCY_WEIGHT: f64 = 0.3;
pub const DEFAULT_EVIDENCE_WEIGHT: f64 = 0.2;
pub const DEFAULT_THROTTLE_BATCH_SIZE: usize = 10;
pub const DEFAULT_THROTTLE_YIELD_MS: u64 = 5;

// --- Slow path ---
pub const DEFAULT_SLOW_PATH_CONCURRENCY: usize = 4;
pub const DEFAULT_SLOW_PATH_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_SLOW_PATH_MAX_RETRIES: u32 = 2;
pub const DEFAULT_SLOW_PATH_BACKOFF_MS: u64 = 500;
pub const DEFAULT_SLOW_PATH_MIN_SUPPORT: usize = 1;

// --- Reconsolidation ---
pub const DEFAULT_RECONSOLIDATION_WINDOW_MINUTES: u64 = 60;

// --- Contradiction ---
pub const DEFAULT_TOPICAL_SIMILARITY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_AUTO_RESOLVE_SEVERITY: f64 = 0.6;
pub const DEFAULT_REVIEW_SEVERITY: f64 = 0.3;
pub const DEFAULT_RECENCY_HORIZON_DAYS: u64 = 30;

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "somnus.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Providers ---
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 768;
pub const DEFAULT_REASONING_MODEL: &str = "llama3.1";
pub const DEFAULT_REASONER: &str = "ollama";

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
