use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub dir: PathBuf,
    pub artifact_file: String,
    pub schema_file: String,
    pub metadata_file: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            artifact_file: "model.json".to_string(),
            schema_file: "feature_names.json".to_string(),
            metadata_file: "model_metadata.json".to_string(),
        }
    }
}

impl ModelConfig {
    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(&self.artifact_file)
    }

    pub fn schema_path(&self) -> PathBuf {
        self.dir.join(&self.schema_file)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(&self.metadata_file)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerMode {
    Artifact,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub mode: String,
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            mode: "artifact".to_string(),
            endpoint: "http://localhost:8000".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl ScorerConfig {
    pub fn to_mode(&self) -> ScorerMode {
        match self.mode.to_lowercase().as_str() {
            "remote" | "http" => ScorerMode::Remote,
            _ => ScorerMode::Artifact,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Two-sided interval level: 0.90, 0.95 or 0.99. Other values use 0.95's z.
    pub confidence_level: f64,
    pub fallback_band: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            fallback_band: 0.10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub min_duration_minutes: f64,
    pub max_duration_minutes: f64,
    pub iqr_multiplier: f64,
    pub min_like_ratio: f64,
    pub max_age_days: i64,
    pub subscriber_cap_quantile: f64,
    pub subscriber_cap_multiplier: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            min_duration_minutes: 0.5,
            max_duration_minutes: 480.0,
            iqr_multiplier: 3.0,
            min_like_ratio: 0.001,
            max_age_days: 1095,
            subscriber_cap_quantile: 0.99,
            subscriber_cap_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub model: ModelConfig,
    pub scorer: ScorerConfig,
    pub inference: InferenceConfig,
    pub batch: BatchConfig,
    pub server: ServerConfig,
}

impl ForecastConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents =
                    std::fs::read_to_string(path).map_err(|err| ForecastError::io(path, err))?;
                toml::from_str(&contents).map_err(|err| ForecastError::parse("config", err))?
            }
            _ => ForecastConfig::default(),
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| ForecastError::io(parent, err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| ForecastError::Config(format!("failed to serialize config: {}", err)))?;
        std::fs::write(path, payload).map_err(|err| ForecastError::io(path, err))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("FORECAST_MODEL_DIR") {
            if !dir.trim().is_empty() {
                self.model.dir = PathBuf::from(dir);
            }
        }
        if let Ok(mode) = env::var("SCORER_MODE") {
            if !mode.trim().is_empty() {
                self.scorer.mode = mode;
            }
        }
        if let Ok(endpoint) = env::var("SCORER_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.scorer.endpoint = endpoint;
            }
        }
        if let Ok(timeout) = env::var("SCORER_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.scorer.timeout_ms = value;
            }
        }
        if let Ok(port) = env::var("FORECAST_PORT") {
            if let Ok(value) = port.parse::<u16>() {
                self.server.port = value;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("FORECAST_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/forecast.toml")))
}
