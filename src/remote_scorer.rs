use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::assembly::{CanonicalFeatureSchema, FeatureVector};
use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};

#[derive(Clone)]
pub struct RemoteScorer {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteScoreRequest<'a> {
    pub schema_fingerprint: String,
    pub feature_names: &'a [String],
    pub features: &'a [f64],
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteScoreResponse {
    pub prediction: f64,
}

impl RemoteScorer {
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.scorer.timeout_ms);
        RemoteScorer::new(config.scorer.endpoint.clone(), timeout)
    }

    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ForecastError::Config(format!("failed to build scorer client: {}", err)))?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn score(&self, schema: &CanonicalFeatureSchema, vector: &FeatureVector) -> Result<f64> {
        let url = format!("{}/predict", self.endpoint.trim_end_matches('/'));
        let request = RemoteScoreRequest {
            schema_fingerprint: schema.fingerprint(),
            feature_names: schema.names(),
            features: vector.values(),
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|err| ForecastError::ScorerUnavailable(format!("scorer request failed: {}", err)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ForecastError::Scorer(format!("scorer error {}: {}", status, body)));
        }

        let payload = response
            .json::<RemoteScoreResponse>()
            .await
            .map_err(|err| ForecastError::Scorer(format!("scorer response parse failed: {}", err)))?;

        if !payload.prediction.is_finite() {
            return Err(ForecastError::Scorer("scorer returned a non-finite prediction".to_string()));
        }
        Ok(payload.prediction)
    }
}
