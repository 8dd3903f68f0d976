pub mod filters;
pub mod matrix;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{ForecastError, Result};
use crate::features::{EngagementRates, FeatureBag};
use crate::features::channel::PostPublishStats;
use crate::{engineer_features_at, VideoRecord};

pub use filters::{
    ChannelMedianFill, DatasetCleaner, Deduplicate, DurationRange, MinEngagement, PositiveViews,
    QualityFilter, Recency, SubscriberCap, TargetIqr,
};
pub use matrix::TrainingMatrix;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRow {
    pub video_id: String,
    #[serde(flatten)]
    pub record: VideoRecord,
    #[serde(default)]
    pub stats: Option<PostPublishStats>,
    pub target_first_week_views: f64,
    #[serde(skip)]
    pub channel_gaps: ChannelGaps,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelGaps {
    pub subscribers: bool,
    pub video_count: bool,
    pub view_count: bool,
}

impl ChannelGaps {
    pub fn any(&self) -> bool {
        self.subscribers || self.video_count || self.view_count
    }
}

impl TrainingRow {
    pub fn new(
        video_id: impl Into<String>,
        record: VideoRecord,
        stats: Option<PostPublishStats>,
        target_first_week_views: f64,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            record,
            stats,
            target_first_week_views,
            channel_gaps: ChannelGaps::default(),
        }
    }

    /// Parses one JSONL line, noting which channel counts were missing
    /// before they default to zero.
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        let mut value: Value = serde_json::from_str(line)?;
        let mut gaps = ChannelGaps::default();
        if let Some(object) = value.as_object_mut() {
            gaps.subscribers = take_gap(object, "channel_subscribers");
            gaps.video_count = take_gap(object, "channel_video_count");
            gaps.view_count = take_gap(object, "channel_view_count");
        }
        let mut row: TrainingRow = serde_json::from_value(value)?;
        row.channel_gaps = gaps;
        Ok(row)
    }

    pub fn engineer(&self, now: NaiveDateTime) -> FeatureBag {
        let mut bag = engineer_features_at(&self.record, now);
        if let Some(stats) = &self.stats {
            EngagementRates::from_stats(stats).write_into(&mut bag);
            bag.sanitize_numeric();
        }
        bag
    }
}

pub fn read_rows_jsonl(path: &Path) -> Result<Vec<TrainingRow>> {
    let file = std::fs::File::open(path).map_err(|err| ForecastError::io(path, err))?;
    let reader = BufReader::new(file);
    let mut rows = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| ForecastError::io(path, err))?;
        if line.trim().is_empty() {
            continue;
        }
        let row = TrainingRow::from_json(&line)
            .map_err(|err| ForecastError::parse(format!("row {} of {}", index + 1, path.display()), err))?;
        rows.push(row);
    }

    Ok(rows)
}

pub fn write_rows_jsonl(path: &Path, rows: &[TrainingRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| ForecastError::io(parent, err))?;
    }
    let file = std::fs::File::create(path).map_err(|err| ForecastError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        let line = serde_json::to_string(row).map_err(|err| ForecastError::parse("training row", err))?;
        writeln!(writer, "{}", line).map_err(|err| ForecastError::io(path, err))?;
    }
    writer.flush().map_err(|err| ForecastError::io(path, err))
}

fn take_gap(object: &mut Map<String, Value>, key: &str) -> bool {
    match object.get(key) {
        None => true,
        Some(Value::Null) => {
            object.remove(key);
            true
        }
        Some(_) => false,
    }
}
