use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use view_forecast::config::{ForecastConfig, InferenceConfig};
use view_forecast::model::{
    CvScore, LinearArtifact, ModelContext, ModelHandle, ModelMetadata, RobustScaler, Scorer,
    ScorerBackend,
};
use view_forecast::remote_scorer::RemoteScorer;
use view_forecast::{forecast, CanonicalFeatureSchema, FeatureVector, ForecastError, VideoRecord};

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn artifact(feature_names: &[&str], coefficients: Vec<f64>, intercept: f64) -> LinearArtifact {
    let count = feature_names.len();
    LinearArtifact {
        model_name: "Ridge".to_string(),
        feature_names: names(feature_names),
        scaler: RobustScaler {
            center: vec![0.0; count],
            scale: vec![1.0; count],
        },
        coefficients,
        intercept,
        log_target: false,
    }
}

fn subscriber_context(metadata: ModelMetadata) -> ModelContext {
    let schema = CanonicalFeatureSchema::new(names(&["channel_subscribers", "title_length"])).unwrap();
    let scorer = artifact(&["channel_subscribers", "title_length"], vec![0.1, 0.0], 0.0);
    ModelContext::new(schema, ScorerBackend::Local(Arc::new(scorer)), metadata).unwrap()
}

#[test]
fn linear_artifact_scales_then_predicts() {
    let model = LinearArtifact {
        scaler: RobustScaler {
            center: vec![1.0, 0.0],
            scale: vec![2.0, 0.0],
        },
        ..artifact(&["a", "b"], vec![10.0, 1.0], 5.0)
    };

    let score = model.score(&FeatureVector::new(vec![3.0, 4.0])).unwrap();
    // (3 - 1) / 2 * 10 + 4 / 1 * 1 + 5
    assert!((score - 19.0).abs() < 1e-9);
}

#[test]
fn log_target_is_mapped_back_to_views() {
    let model = LinearArtifact {
        log_target: true,
        ..artifact(&["a"], vec![0.0], 101.0_f64.ln())
    };
    let score = model.score(&FeatureVector::new(vec![7.0])).unwrap();
    assert!((score - 100.0).abs() < 1e-6);
}

#[test]
fn artifact_validation_and_wrong_length_vectors() {
    let broken = LinearArtifact {
        coefficients: vec![1.0],
        ..artifact(&["a", "b"], vec![1.0, 1.0], 0.0)
    };
    assert!(matches!(broken.validate(), Err(ForecastError::SchemaMismatch(_))));

    let model = artifact(&["a", "b"], vec![1.0, 1.0], 0.0);
    let result = model.score(&FeatureVector::new(vec![1.0]));
    assert!(matches!(result, Err(ForecastError::Scorer(_))));
}

#[test]
fn context_rejects_a_scorer_built_for_another_schema() {
    let schema = CanonicalFeatureSchema::new(names(&["a", "c"])).unwrap();
    let scorer = artifact(&["a", "b"], vec![1.0, 1.0], 0.0);
    let result = ModelContext::new(
        schema,
        ScorerBackend::Local(Arc::new(scorer)),
        ModelMetadata::default(),
    );
    assert!(matches!(result, Err(ForecastError::SchemaMismatch(_))));
}

#[test]
fn metadata_cv_scores() {
    let mut cv_scores = BTreeMap::new();
    cv_scores.insert("Ridge".to_string(), CvScore { mean: 0.81, std: 0.02 });
    cv_scores.insert("XGBoost".to_string(), CvScore { mean: 0.88, std: 0.03 });
    let metadata = ModelMetadata {
        model_name: "Ridge".to_string(),
        cv_scores,
        ..ModelMetadata::default()
    };

    assert_eq!(metadata.best_cv_r2(), Some(0.88));
    assert_eq!(metadata.model_cv_score(), 0.81);

    let unknown = ModelMetadata {
        model_name: "Lasso".to_string(),
        ..metadata.clone()
    };
    assert_eq!(unknown.model_cv_score(), 0.88);
    assert_eq!(ModelMetadata::default().best_cv_r2(), None);
    assert_eq!(ModelMetadata::default().model_cv_score(), 0.0);
}

#[tokio::test]
async fn empty_handle_reports_scorer_unavailable() {
    let handle = ModelHandle::empty();
    assert!(!handle.is_loaded().await);
    assert!(matches!(
        handle.current().await,
        Err(ForecastError::ScorerUnavailable(_))
    ));
}

#[tokio::test]
async fn context_checks_vector_length() {
    let context = subscriber_context(ModelMetadata::default());
    let result = context.score(&FeatureVector::new(vec![1.0])).await;
    assert!(matches!(result, Err(ForecastError::SchemaMismatch(_))));
}

#[tokio::test]
async fn forecast_runs_the_full_serving_path() {
    let metadata = ModelMetadata {
        model_name: "Ridge".to_string(),
        prediction_interval_std: Some(500.0),
        ..ModelMetadata::default()
    };
    let handle = ModelHandle::with_context(subscriber_context(metadata));
    let context = handle.current().await.unwrap();

    let record = VideoRecord {
        title: "Learn Python in 10 Minutes".to_string(),
        published_at: Some("2024-03-13T19:00:00".to_string()),
        channel_subscribers: 50_000,
        ..VideoRecord::default()
    };
    let result = forecast(&context, &record, &InferenceConfig::default())
        .await
        .unwrap();

    assert_eq!(result.prediction.first_week_views, 5_000);
    assert_eq!(result.prediction.interval.min, 4_020.0);
    assert_eq!(result.prediction.interval.max, 5_980.0);
    assert_eq!(result.model_name, "Ridge");
    assert_eq!(result.features_used, 2);
    assert_eq!(result.missing_features, 0);
}

#[tokio::test]
async fn context_loads_from_disk_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ForecastConfig::default();
    config.model.dir = dir.path().to_path_buf();
    config.scorer.mode = "artifact".to_string();

    let feature_names = ["channel_subscribers", "title_length"];
    CanonicalFeatureSchema::new(names(&feature_names))
        .unwrap()
        .write(&config.model.schema_path())
        .unwrap();
    artifact(&feature_names, vec![0.1, 0.0], 0.0)
        .write(&config.model.artifact_path())
        .unwrap();

    let handle = ModelHandle::empty();
    let context = handle.reload(&config).await.unwrap();
    assert!(handle.is_loaded().await);
    assert_eq!(context.metadata().model_name, "Unknown");
    assert_eq!(context.backend().label(), "artifact");

    ModelMetadata {
        model_name: "Ridge".to_string(),
        ..ModelMetadata::default()
    }
    .write(&config.model.metadata_path())
    .unwrap();
    let reloaded = handle.reload(&config).await.unwrap();
    assert_eq!(reloaded.metadata().model_name, "Ridge");
}

#[tokio::test]
async fn failed_reload_keeps_the_previous_context() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ForecastConfig::default();
    config.model.dir = dir.path().join("missing");

    let handle = ModelHandle::with_context(subscriber_context(ModelMetadata::default()));
    assert!(handle.reload(&config).await.is_err());
    assert!(handle.current().await.is_ok());
}

#[tokio::test]
async fn unreachable_remote_scorer_is_unavailable() {
    let schema = CanonicalFeatureSchema::new(names(&["a"])).unwrap();
    let remote = RemoteScorer::new("http://127.0.0.1:9".to_string(), Duration::from_millis(500)).unwrap();
    let context = ModelContext::new(
        schema,
        ScorerBackend::Remote(remote),
        ModelMetadata::default(),
    )
    .unwrap();

    let result = context.score(&FeatureVector::new(vec![1.0])).await;
    assert!(matches!(result, Err(ForecastError::ScorerUnavailable(_))));
}
