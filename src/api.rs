use serde::{Deserialize, Serialize};
use view_forecast::features::content::parse_tag_list;
use view_forecast::inference::Recommendation;
use view_forecast::{ForecastError, Forecast, Result, VideoRecord};

#[derive(Debug, Default, Deserialize)]
pub struct ApiPredictionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub publish_date: Option<String>,
    pub publish_hour: Option<u8>,
    pub duration_minutes: Option<f64>,
    pub tags: Option<String>,
    pub tag_count: Option<f64>,
    pub channel_subscribers: Option<f64>,
    pub channel_video_count: Option<f64>,
    pub channel_view_count: Option<f64>,
}

impl ApiPredictionRequest {
    pub fn into_record(self) -> Result<VideoRecord> {
        let mut record = VideoRecord::default();
        record.title = self.title.unwrap_or_default().trim().to_string();
        record.description = self.description.unwrap_or_default();
        record.published_at = self.publish_date.filter(|value| !value.trim().is_empty());
        record.publish_hour = self.publish_hour.map(|hour| hour.min(23));

        if let Some(minutes) = self.duration_minutes {
            if !minutes.is_finite() || minutes < 0.0 {
                return Err(ForecastError::InvalidInput(format!(
                    "duration_minutes must be a non-negative number, got {}",
                    minutes
                )));
            }
            record.set_duration_minutes(minutes);
        }

        if let Some(tags) = self.tags.as_deref() {
            record.tags = parse_tag_list(tags);
        }
        if let Some(count) = self.tag_count {
            record.tag_count = Some(non_negative("tag_count", count)? as u32);
        }

        if let Some(value) = self.channel_subscribers {
            record.channel_subscribers = non_negative("channel_subscribers", value)? as u64;
        }
        if let Some(value) = self.channel_video_count {
            record.channel_video_count = non_negative("channel_video_count", value)? as u64;
        }
        if let Some(value) = self.channel_view_count {
            record.channel_view_count = non_negative("channel_view_count", value)? as u64;
        }

        Ok(record)
    }
}

fn non_negative(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ForecastError::InvalidInput(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(value.trunc())
}

#[derive(Debug, Serialize)]
pub struct ApiPredictionResponse {
    pub success: bool,
    pub prediction: ApiPrediction,
    pub recommendations: Vec<Recommendation>,
    pub features_used: usize,
    pub model_info: ApiModelSummary,
}

#[derive(Debug, Serialize)]
pub struct ApiPrediction {
    pub first_week_views: u64,
    pub confidence: f64,
    pub accuracy: f64,
    pub range: ApiRange,
    pub margin: u64,
}

#[derive(Debug, Serialize)]
pub struct ApiRange {
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Serialize)]
pub struct ApiModelSummary {
    pub model_name: String,
    pub cv_score: f64,
    pub r2_score: f64,
}

impl From<Forecast> for ApiPredictionResponse {
    fn from(forecast: Forecast) -> Self {
        let prediction = forecast.prediction;
        Self {
            success: true,
            prediction: ApiPrediction {
                first_week_views: prediction.first_week_views,
                confidence: prediction.confidence,
                accuracy: prediction.accuracy,
                range: ApiRange {
                    min: prediction.interval.min.max(0.0) as u64,
                    max: prediction.interval.max.max(0.0) as u64,
                },
                margin: prediction.interval.margin.max(0.0) as u64,
            },
            recommendations: prediction.recommendations,
            features_used: forecast.features_used,
            model_info: ApiModelSummary {
                model_name: forecast.model_name,
                cv_score: forecast.cv_score,
                r2_score: forecast.cv_score,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiModelInfo {
    pub model_name: String,
    pub training_date: String,
    pub feature_count: usize,
    pub schema_fingerprint: String,
    pub backend: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiHealth {
    pub status: &'static str,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
