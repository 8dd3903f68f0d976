use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::assembly::{CanonicalFeatureSchema, FeatureVector};
use crate::config::{ForecastConfig, ScorerMode};
use crate::error::{ForecastError, Result};
use crate::remote_scorer::RemoteScorer;

pub const DEFAULT_CV_R2: f64 = 0.85;

#[derive(Debug, Clone, PartialEq)]
pub struct ScaledVector(pub Vec<f64>);

pub trait Scorer: Send + Sync {
    fn feature_names(&self) -> &[String];

    fn transform(&self, vector: &FeatureVector) -> Result<ScaledVector>;

    fn predict(&self, scaled: &ScaledVector) -> Result<f64>;

    fn score(&self, vector: &FeatureVector) -> Result<f64> {
        let scaled = self.transform(vector)?;
        self.predict(&scaled)
    }
}

/// Median/IQR scaling. Zero scales are treated as 1 so constant columns
/// pass through centred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobustScaler {
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub model_name: String,
    pub feature_names: Vec<String>,
    pub scaler: RobustScaler,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Target was fitted as `ln(1 + views)`; predictions are mapped back.
    #[serde(default)]
    pub log_target: bool,
}

impl LinearArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|err| ForecastError::io(path, err))?;
        let artifact: LinearArtifact =
            serde_json::from_str(&data).map_err(|err| ForecastError::parse("model artifact", err))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)
            .map_err(|err| ForecastError::parse("model artifact", err))?;
        std::fs::write(path, payload).map_err(|err| ForecastError::io(path, err))
    }

    pub fn validate(&self) -> Result<()> {
        let expected = self.feature_names.len();
        let lengths = [
            ("scaler.center", self.scaler.center.len()),
            ("scaler.scale", self.scaler.scale.len()),
            ("coefficients", self.coefficients.len()),
        ];
        for (field, len) in lengths {
            if len != expected {
                return Err(ForecastError::SchemaMismatch(format!(
                    "artifact {} has {} entries, expected {}",
                    field, len, expected
                )));
            }
        }
        Ok(())
    }
}

impl Scorer for LinearArtifact {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn transform(&self, vector: &FeatureVector) -> Result<ScaledVector> {
        if vector.len() != self.feature_names.len() {
            return Err(ForecastError::Scorer(format!(
                "vector has {} values, model expects {}",
                vector.len(),
                self.feature_names.len()
            )));
        }
        let scaled = vector
            .values()
            .iter()
            .zip(self.scaler.center.iter().zip(&self.scaler.scale))
            .map(|(value, (center, scale))| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (value - center) / scale
            })
            .collect();
        Ok(ScaledVector(scaled))
    }

    fn predict(&self, scaled: &ScaledVector) -> Result<f64> {
        let linear = self.intercept
            + scaled
                .0
                .iter()
                .zip(&self.coefficients)
                .map(|(value, weight)| value * weight)
                .sum::<f64>();
        let prediction = if self.log_target {
            linear.exp_m1()
        } else {
            linear
        };
        if !prediction.is_finite() {
            return Err(ForecastError::Scorer(format!(
                "non-finite prediction from {}",
                self.model_name
            )));
        }
        Ok(prediction)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CvScore {
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_name: String,
    #[serde(default)]
    pub training_date: Option<String>,
    #[serde(default)]
    pub feature_count: usize,
    #[serde(default)]
    pub cv_scores: BTreeMap<String, CvScore>,
    #[serde(default)]
    pub prediction_interval_std: Option<f64>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            model_name: "Unknown".to_string(),
            training_date: None,
            feature_count: 0,
            cv_scores: BTreeMap::new(),
            prediction_interval_std: None,
        }
    }
}

impl ModelMetadata {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|err| ForecastError::io(path, err))?;
        serde_json::from_str(&data).map_err(|err| ForecastError::parse("model metadata", err))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| ForecastError::io(parent, err))?;
        }
        let payload = serde_json::to_string_pretty(self)
            .map_err(|err| ForecastError::parse("model metadata", err))?;
        std::fs::write(path, payload).map_err(|err| ForecastError::io(path, err))
    }

    pub fn best_cv_r2(&self) -> Option<f64> {
        self.cv_scores
            .values()
            .map(|score| score.mean)
            .filter(|mean| mean.is_finite())
            .fold(None, |best, mean| match best {
                Some(current) if current >= mean => Some(current),
                _ => Some(mean),
            })
    }

    pub fn model_cv_score(&self) -> f64 {
        self.cv_scores
            .get(&self.model_name)
            .map(|score| score.mean)
            .or_else(|| self.best_cv_r2())
            .unwrap_or(0.0)
    }
}

#[derive(Clone)]
pub enum ScorerBackend {
    Local(Arc<dyn Scorer>),
    Remote(RemoteScorer),
}

impl ScorerBackend {
    pub fn label(&self) -> &'static str {
        match self {
            ScorerBackend::Local(_) => "artifact",
            ScorerBackend::Remote(_) => "remote",
        }
    }
}

pub struct ModelContext {
    schema: CanonicalFeatureSchema,
    backend: ScorerBackend,
    metadata: ModelMetadata,
}

impl ModelContext {
    pub fn new(
        schema: CanonicalFeatureSchema,
        backend: ScorerBackend,
        metadata: ModelMetadata,
    ) -> Result<Self> {
        if let ScorerBackend::Local(scorer) = &backend {
            if scorer.feature_names() != schema.names() {
                return Err(ForecastError::SchemaMismatch(format!(
                    "scorer declares {} features, schema has {}",
                    scorer.feature_names().len(),
                    schema.len()
                )));
            }
        }
        Ok(Self {
            schema,
            backend,
            metadata,
        })
    }

    pub fn load(config: &ForecastConfig) -> Result<Self> {
        let schema = CanonicalFeatureSchema::load(&config.model.schema_path())?;
        let metadata_path = config.model.metadata_path();
        let metadata = if metadata_path.exists() {
            ModelMetadata::load(&metadata_path)?
        } else {
            ModelMetadata::default()
        };

        let backend = match config.scorer.to_mode() {
            ScorerMode::Artifact => {
                let artifact = LinearArtifact::load(&config.model.artifact_path())?;
                ScorerBackend::Local(Arc::new(artifact))
            }
            ScorerMode::Remote => ScorerBackend::Remote(RemoteScorer::from_config(config)?),
        };

        let context = ModelContext::new(schema, backend, metadata)?;
        info!(
            model = %context.metadata.model_name,
            backend = context.backend.label(),
            features = context.schema.len(),
            fingerprint = %context.schema.fingerprint(),
            "model context loaded"
        );
        Ok(context)
    }

    pub fn schema(&self) -> &CanonicalFeatureSchema {
        &self.schema
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn backend(&self) -> &ScorerBackend {
        &self.backend
    }

    pub async fn score(&self, vector: &FeatureVector) -> Result<f64> {
        if vector.len() != self.schema.len() {
            return Err(ForecastError::SchemaMismatch(format!(
                "vector has {} values, schema has {}",
                vector.len(),
                self.schema.len()
            )));
        }
        match &self.backend {
            ScorerBackend::Local(scorer) => scorer.score(vector),
            ScorerBackend::Remote(client) => client.score(&self.schema, vector).await,
        }
    }
}

#[derive(Default)]
pub struct ModelHandle {
    current: RwLock<Option<Arc<ModelContext>>>,
}

impl ModelHandle {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_context(context: ModelContext) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(context))),
        }
    }

    pub async fn current(&self) -> Result<Arc<ModelContext>> {
        let guard = self.current.read().await;
        guard.clone().ok_or_else(|| {
            ForecastError::ScorerUnavailable("model not loaded, train the model first".to_string())
        })
    }

    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.is_some()
    }

    pub async fn replace(&self, context: ModelContext) -> Arc<ModelContext> {
        let context = Arc::new(context);
        let mut guard = self.current.write().await;
        *guard = Some(context.clone());
        context
    }

    /// Loads a fresh context from disk and swaps it in. On failure the
    /// previous context stays active.
    pub async fn reload(&self, config: &ForecastConfig) -> Result<Arc<ModelContext>> {
        let context = ModelContext::load(config)?;
        Ok(self.replace(context).await)
    }
}
