use somnus_core::config::*;
use somnus_core::errors::{ErrorKind, SomnusError};

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = SomnusConfig::from_toml("").unwrap();

    // Consolidation defaults
    assert_eq!(config.consolidation.time_window_hours, 24);
    assert_eq!(config.consolidation.proximity_threshold_minutes, 5);
    assert_eq!(config.consolidation.similarity_threshold, 0.75);
    assert_eq!(config.consolidation.min_pattern_confidence, 0.7);
    assert_eq!(config.consolidation.discard_confidence_floor, 0.3);

    // Slow path defaults
    assert_eq!(config.slow_path.concurrency, 4);
    assert_eq!(config.slow_path.timeout_seconds, 10);
    assert_eq!(config.slow_path.max_retries, 2);

    // Reconsolidation and contradiction defaults
    assert_eq!(config.reconsolidation.window_minutes, 60);
    assert_eq!(config.contradiction.auto_resolve_severity, 0.6);
    assert_eq!(config.contradiction.topical_similarity_threshold, 0.8);

    // Storage and observability defaults
    assert_eq!(config.storage.db_path, "somnus.db");
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[consolidation]
time_window_hours = 48
min_pattern_confidence = 0.8

[slow_path]
concurrency = 2
"#;
    let config = SomnusConfig::from_toml(toml).unwrap();
    assert_eq!(config.consolidation.time_window_hours, 48);
    assert_eq!(config.consolidation.min_pattern_confidence, 0.8);
    assert_eq!(config.slow_path.concurrency, 2);
    // Non-overridden fields keep defaults
    assert_eq!(config.consolidation.proximity_threshold_minutes, 5);
    assert_eq!(config.slow_path.timeout_seconds, 10);
}

#[test]
fn config_rejects_out_of_range_threshold() {
    let err = SomnusConfig::from_toml("[consolidation]\nsimilarity_threshold = 1.5\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("consolidation.similarity_threshold"));
}

#[test]
fn config_rejects_floor_above_threshold() {
    let toml = "[consolidation]\nmin_pattern_confidence = 0.4\ndiscard_confidence_floor = 0.5\n";
    assert!(SomnusConfig::from_toml(toml).is_err());
}

#[test]
fn config_rejects_unknown_reasoner() {
    let err = SomnusConfig::from_toml("[providers]\nreasoner = \"oracle\"\n").unwrap_err();
    assert!(matches!(err, SomnusError::ConfigError(_)));
}

#[test]
fn config_rejects_malformed_toml() {
    assert!(SomnusConfig::from_toml("[consolidation\n").is_err());
}

#[test]
fn config_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("somnus.toml");
    std::fs::write(&path, "[reconsolidation]\nwindow_minutes = 15\n").unwrap();
    let config = SomnusConfig::from_file(&path).unwrap();
    assert_eq!(config.reconsolidation.window_minutes, 15);
    assert_eq!(config.reconsolidation.window(), chrono::Duration::minutes(15));
}

#[test]
fn missing_config_file_is_a_read_error() {
    let err = SomnusConfig::from_file(std::path::Path::new("/nonexistent/somnus.toml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config"));
}
