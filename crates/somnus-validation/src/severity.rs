//! Severity of a contradiction:
//! `0.5 * topical_overlap + 0.3 * recency_skew + 0.2 * (1 - |eq_a - eq_b|)`.

use chrono::{DateTime, Duration, Utc};

/// Close in time means more severe: `1 - min(1, |a - b| / horizon)`.
pub fn recency_skew(a: DateTime<Utc>, b: DateTime<Utc>, horizon: Duration) -> f64 {
    let horizon_ms = horizon.num_milliseconds();
    if horizon_ms <= 0 {
        return 0.0;
    }
    let gap_ms = (a - b).num_milliseconds().abs() as f64;
    1.0 - (gap_ms / horizon_ms as f64).min(1.0)
}

pub fn severity(topical_overlap: f64, recency_skew: f64, eq_a: f64, eq_b: f64) -> f64 {
    let parity = 1.0 - (eq_a - eq_b).abs();
    (0.5 * topical_overlap + 0.3 * recency_skew + 0.2 * parity).clamp(0.0, 1.0)
}
