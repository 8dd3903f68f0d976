use view_forecast::config::{ForecastConfig, ScorerMode};

#[test]
fn defaults_when_the_file_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    let (config, resolved) = ForecastConfig::load(Some(path.clone())).unwrap();

    assert_eq!(resolved, Some(path));
    assert_eq!(config.model.artifact_file, "model.json");
    assert_eq!(config.inference.confidence_level, 0.95);
    assert_eq!(config.inference.fallback_band, 0.10);
    assert_eq!(config.batch.iqr_multiplier, 3.0);
    assert_eq!(config.batch.subscriber_cap_quantile, 0.99);
    assert_eq!(config.batch.subscriber_cap_multiplier, 2.0);
    assert!(config.model.schema_path().ends_with("feature_names.json"));
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forecast.toml");
    std::fs::write(
        &path,
        "[scorer]\nmode = \"remote\"\n\n[inference]\nconfidence_level = 0.99\n",
    )
    .unwrap();

    let (config, _) = ForecastConfig::load(Some(path)).unwrap();
    assert_eq!(config.scorer.to_mode(), ScorerMode::Remote);
    assert_eq!(config.inference.confidence_level, 0.99);
    assert_eq!(config.inference.fallback_band, 0.10);
    assert_eq!(config.batch.min_duration_minutes, 0.5);
}

#[test]
fn written_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("forecast.toml");
    let mut config = ForecastConfig::default();
    config.batch.max_duration_minutes = 240.0;
    config.scorer.timeout_ms = 1500;
    config.write(&path).unwrap();

    let (loaded, _) = ForecastConfig::load(Some(path)).unwrap();
    assert_eq!(loaded.batch.max_duration_minutes, 240.0);
    assert_eq!(loaded.scorer.timeout_ms, 1500);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forecast.toml");
    std::fs::write(&path, "[scorer\nmode = 3").unwrap();
    assert!(ForecastConfig::load(Some(path)).is_err());
}

#[test]
fn unknown_scorer_mode_means_artifact() {
    let mut config = ForecastConfig::default();
    assert_eq!(config.scorer.to_mode(), ScorerMode::Artifact);
    config.scorer.mode = "HTTP".to_string();
    assert_eq!(config.scorer.to_mode(), ScorerMode::Remote);
    config.scorer.mode = "onnx".to_string();
    assert_eq!(config.scorer.to_mode(), ScorerMode::Artifact);
}
