pub mod assembly;
pub mod batch;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod inference;
pub mod model;
pub mod remote_scorer;
pub mod synthetic;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assembly::assemble_with_report;
use crate::config::InferenceConfig;
use crate::features::{
    categorical, channel, content, derived, duration, temporal, title, EncodedRecord, FeatureBag,
};
use crate::inference::{post_process, ConfidenceInputs, PredictionResult};
use crate::model::ModelContext;

pub use crate::assembly::{assemble_vector, CanonicalFeatureSchema, FeatureVector};
pub use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub published_at: Option<String>,
    /// Overrides the timestamp's own hour when present.
    #[serde(default)]
    pub publish_hour: Option<u8>,
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tag_count: Option<u32>,
    #[serde(default)]
    pub channel_subscribers: u64,
    #[serde(default)]
    pub channel_video_count: u64,
    #[serde(default)]
    pub channel_view_count: u64,
}

impl Default for VideoRecord {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            published_at: None,
            publish_hour: None,
            duration_seconds: 600.0,
            tags: Vec::new(),
            tag_count: None,
            channel_subscribers: 100_000,
            channel_video_count: 100,
            channel_view_count: 1_000_000,
        }
    }
}

impl VideoRecord {
    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }

    pub fn set_duration_minutes(&mut self, minutes: f64) {
        self.duration_seconds = minutes * 60.0;
    }

    pub fn effective_tag_count(&self) -> u32 {
        self.tag_count.unwrap_or(self.tags.len() as u32)
    }
}

pub fn engineer_features(record: &VideoRecord) -> FeatureBag {
    engineer_features_at(record, Local::now().naive_local())
}

/// Deterministic variant of [`engineer_features`]: `now` is only consulted
/// when the record's own timestamp cannot be used.
pub fn engineer_features_at(record: &VideoRecord, now: NaiveDateTime) -> FeatureBag {
    let encoded = encode_record(record, now);
    let mut bag = FeatureBag::new();

    encoded.title.write_into(&mut bag);
    encoded.temporal.write_into(&mut bag);
    encoded.duration.write_into(&mut bag);
    encoded.channel.write_into(&mut bag);
    encoded.content.write_into(&mut bag);

    derived::write_derived(&encoded, &mut bag);
    let replaced = bag.sanitize_numeric();
    if replaced > 0 {
        debug!(replaced, "sanitized non-finite derived features");
    }

    categorical::encode_categoricals(&mut bag);
    bag
}

pub fn encode_record(record: &VideoRecord, now: NaiveDateTime) -> EncodedRecord {
    let publish = temporal::resolve_publish_time(
        record.published_at.as_deref(),
        record.publish_hour,
        now,
    );

    EncodedRecord {
        title: title::analyze_title(&record.title),
        lexicon: title::analyze_title_lexicon(&record.title),
        temporal: temporal::encode_temporal(&publish),
        duration: duration::DurationFeatures::from_seconds(record.duration_seconds),
        channel: channel::ChannelFeatures::new(
            record.channel_subscribers,
            record.channel_video_count,
            record.channel_view_count,
        ),
        content: content::ContentFeatures::new(&record.description, record.effective_tag_count()),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub prediction: PredictionResult,
    pub model_name: String,
    pub cv_score: f64,
    pub features_used: usize,
    pub missing_features: usize,
}

pub async fn forecast(
    context: &ModelContext,
    record: &VideoRecord,
    inference: &InferenceConfig,
) -> Result<Forecast> {
    let bag = engineer_features(record);
    let assembly = assemble_with_report(&bag, context.schema());
    if !assembly.missing.is_empty() {
        debug!(
            missing = assembly.missing.len(),
            first = ?assembly.missing.iter().take(5).collect::<Vec<_>>(),
            "schema features absent from bag, defaulted to 0.0"
        );
    }

    let raw_score = context.score(&assembly.vector).await?;
    debug!(raw_score, subscribers = record.channel_subscribers, "raw scorer output");

    let metadata = context.metadata();
    let inputs = ConfidenceInputs::from_features(record, &bag)
        .with_best_cv_r2(metadata.best_cv_r2());
    let prediction = post_process(
        raw_score,
        record.channel_subscribers as f64,
        metadata.prediction_interval_std,
        &inputs,
        inference,
    );

    Ok(Forecast {
        prediction,
        model_name: metadata.model_name.clone(),
        cv_score: metadata.model_cv_score(),
        features_used: context.schema().len(),
        missing_features: assembly.missing.len(),
    })
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}
