pub mod clipping;
pub mod confidence;
pub mod interval;
pub mod recommendations;

use serde::Serialize;

use crate::config::InferenceConfig;
use crate::features::{title, FeatureBag};
use crate::VideoRecord;

pub use clipping::ClipBounds;
pub use confidence::{accuracy_estimate, confidence_score};
pub use interval::{estimate_interval, z_score, PredictionInterval};
pub use recommendations::{build_recommendations, Priority, Recommendation, RecommendationKind};

#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceInputs {
    pub title_length: f64,
    pub duration_minutes: f64,
    pub channel_subscribers: f64,
    pub publish_hour: f64,
    pub is_prime_time: bool,
    pub tag_count: f64,
    pub seo_score: f64,
    pub engagement_potential_score: f64,
    pub title_has_number: bool,
    pub title_has_question_framing: bool,
    pub best_cv_r2: Option<f64>,
}

impl Default for ConfidenceInputs {
    fn default() -> Self {
        Self {
            title_length: 0.0,
            duration_minutes: 10.0,
            channel_subscribers: 100_000.0,
            publish_hour: 18.0,
            is_prime_time: false,
            tag_count: 5.0,
            seo_score: 0.0,
            engagement_potential_score: 0.0,
            title_has_number: false,
            title_has_question_framing: false,
            best_cv_r2: None,
        }
    }
}

impl ConfidenceInputs {
    pub fn from_bag(bag: &FeatureBag) -> Self {
        let defaults = Self::default();
        Self {
            title_length: bag.get_or("title_length", defaults.title_length),
            duration_minutes: bag.get_or("duration_minutes", defaults.duration_minutes),
            channel_subscribers: bag.get_or("channel_subscribers", defaults.channel_subscribers),
            publish_hour: bag.get_or("publish_hour", defaults.publish_hour),
            is_prime_time: bag.get_or("is_prime_time", 0.0) == 1.0,
            tag_count: bag.get_or("tag_count", defaults.tag_count),
            seo_score: bag.get_or("seo_score", defaults.seo_score),
            engagement_potential_score: bag
                .get_or("engagement_potential_score", defaults.engagement_potential_score),
            title_has_number: bag.get_or("title_has_number", 0.0) == 1.0,
            title_has_question_framing: false,
            best_cv_r2: None,
        }
    }

    pub fn from_features(record: &VideoRecord, bag: &FeatureBag) -> Self {
        Self {
            title_has_question_framing: title::has_question_framing(&record.title),
            ..Self::from_bag(bag)
        }
    }

    pub fn with_best_cv_r2(mut self, best_cv_r2: Option<f64>) -> Self {
        self.best_cv_r2 = best_cv_r2;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub first_week_views: u64,
    pub raw_score: f64,
    pub bounds: ClipBounds,
    pub interval: PredictionInterval,
    pub confidence: f64,
    pub accuracy: f64,
    pub recommendations: Vec<Recommendation>,
}

pub fn post_process(
    raw_score: f64,
    subscribers: f64,
    residual_std: Option<f64>,
    inputs: &ConfidenceInputs,
    config: &InferenceConfig,
) -> PredictionResult {
    let bounds = ClipBounds::for_subscribers(subscribers);
    let prediction = bounds.clip(raw_score);
    let interval = estimate_interval(
        prediction,
        residual_std,
        config.confidence_level,
        config.fallback_band,
    );

    PredictionResult {
        first_week_views: prediction as u64,
        raw_score,
        bounds,
        interval,
        confidence: confidence_score(inputs),
        accuracy: accuracy_estimate(inputs),
        recommendations: build_recommendations(inputs),
    }
}
