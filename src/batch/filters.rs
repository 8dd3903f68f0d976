use chrono::{Duration, NaiveDateTime};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::batch::{ChannelGaps, TrainingRow};
use crate::config::BatchConfig;
use crate::features::temporal::parse_timestamp;

pub trait QualityFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, rows: Vec<TrainingRow>) -> Vec<TrainingRow>;
}

pub struct Deduplicate;

impl QualityFilter for Deduplicate {
    fn name(&self) -> &'static str {
        "deduplicate"
    }

    fn apply(&self, rows: Vec<TrainingRow>) -> Vec<TrainingRow> {
        let mut seen = HashSet::new();
        rows.into_iter()
            .filter(|row| seen.insert(row.video_id.clone()))
            .collect()
    }
}

pub struct DurationRange {
    pub min_minutes: f64,
    pub max_minutes: f64,
}

impl QualityFilter for DurationRange {
    fn name(&self) -> &'static str {
        "duration_range"
    }

    fn apply(&self, rows: Vec<TrainingRow>) -> Vec<TrainingRow> {
        rows.into_iter()
            .filter(|row| {
                let minutes = row.record.duration_minutes();
                minutes >= self.min_minutes && minutes <= self.max_minutes
            })
            .collect()
    }
}

pub struct PositiveViews;

impl QualityFilter for PositiveViews {
    fn name(&self) -> &'static str {
        "positive_views"
    }

    fn apply(&self, rows: Vec<TrainingRow>) -> Vec<TrainingRow> {
        rows.into_iter()
            .filter(|row| {
                let views_ok = row.stats.map(|stats| stats.view_count > 0).unwrap_or(true);
                views_ok && row.target_first_week_views > 0.0
            })
            .collect()
    }
}

pub struct MinEngagement {
    pub min_like_ratio: f64,
}

impl QualityFilter for MinEngagement {
    fn name(&self) -> &'static str {
        "min_engagement"
    }

    fn apply(&self, rows: Vec<TrainingRow>) -> Vec<TrainingRow> {
        rows.into_iter()
            .filter(|row| match row.stats {
                Some(stats) => {
                    stats.like_count as f64 / (stats.view_count as f64 + 1.0) > self.min_like_ratio
                }
                None => true,
            })
            .collect()
    }
}

pub struct Recency {
    pub now: NaiveDateTime,
    pub max_age: Duration,
}

impl QualityFilter for Recency {
    fn name(&self) -> &'static str {
        "recency"
    }

    fn apply(&self, rows: Vec<TrainingRow>) -> Vec<TrainingRow> {
        let cutoff = self.now - self.max_age;
        rows.into_iter()
            .filter(|row| {
                row.record
                    .published_at
                    .as_deref()
                    .and_then(parse_timestamp)
                    .is_some_and(|published| published >= cutoff)
            })
            .collect()
    }
}

/// Drops targets outside `[Q1 - k*IQR, Q3 + k*IQR]`. Needs at least four
/// rows to say anything.
pub struct TargetIqr {
    pub multiplier: f64,
}

impl QualityFilter for TargetIqr {
    fn name(&self) -> &'static str {
        "target_iqr"
    }

    fn apply(&self, rows: Vec<TrainingRow>) -> Vec<TrainingRow> {
        if rows.len() < 4 {
            return rows;
        }
        let mut targets: Vec<f64> = rows.iter().map(|row| row.target_first_week_views).collect();
        targets.sort_by(f64::total_cmp);

        let q1 = quantile(&targets, 0.25);
        let q3 = quantile(&targets, 0.75);
        let iqr = q3 - q1;
        let lower = q1 - self.multiplier * iqr;
        let upper = q3 + self.multiplier * iqr;

        rows.into_iter()
            .filter(|row| {
                let target = row.target_first_week_views;
                target >= lower && target <= upper
            })
            .collect()
    }
}

/// Fills channel counts a row did not carry with the median of the rows
/// that did.
pub struct ChannelMedianFill;

impl QualityFilter for ChannelMedianFill {
    fn name(&self) -> &'static str {
        "channel_median_fill"
    }

    fn apply(&self, mut rows: Vec<TrainingRow>) -> Vec<TrainingRow> {
        if !rows.iter().any(|row| row.channel_gaps.any()) {
            return rows;
        }
        let subscribers = present_median(&rows, |row| {
            (!row.channel_gaps.subscribers).then_some(row.record.channel_subscribers)
        });
        let video_count = present_median(&rows, |row| {
            (!row.channel_gaps.video_count).then_some(row.record.channel_video_count)
        });
        let view_count = present_median(&rows, |row| {
            (!row.channel_gaps.view_count).then_some(row.record.channel_view_count)
        });

        for row in rows.iter_mut().filter(|row| row.channel_gaps.any()) {
            if row.channel_gaps.subscribers {
                row.record.channel_subscribers = subscribers;
            }
            if row.channel_gaps.video_count {
                row.record.channel_video_count = video_count;
            }
            if row.channel_gaps.view_count {
                row.record.channel_view_count = view_count;
            }
            row.channel_gaps = ChannelGaps::default();
        }
        rows
    }
}

fn present_median(rows: &[TrainingRow], value: impl Fn(&TrainingRow) -> Option<u64>) -> u64 {
    let mut values: Vec<f64> = rows.iter().filter_map(&value).map(|v| v as f64).collect();
    if values.is_empty() {
        warn!("no row carries this channel count; gaps stay at zero");
        return 0;
    }
    values.sort_by(f64::total_cmp);
    quantile(&values, 0.5).round() as u64
}

pub struct SubscriberCap {
    pub quantile: f64,
    pub multiplier: f64,
}

impl QualityFilter for SubscriberCap {
    fn name(&self) -> &'static str {
        "subscriber_cap"
    }

    fn apply(&self, mut rows: Vec<TrainingRow>) -> Vec<TrainingRow> {
        if rows.is_empty() {
            return rows;
        }
        let mut subscribers: Vec<f64> = rows
            .iter()
            .map(|row| row.record.channel_subscribers as f64)
            .collect();
        subscribers.sort_by(f64::total_cmp);
        let cap = (quantile(&subscribers, self.quantile) * self.multiplier).floor() as u64;

        for row in &mut rows {
            row.record.channel_subscribers = row.record.channel_subscribers.min(cap);
        }
        rows
    }
}

pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

pub struct DatasetCleaner {
    filters: Vec<Box<dyn QualityFilter>>,
}

impl DatasetCleaner {
    pub fn new(filters: Vec<Box<dyn QualityFilter>>) -> Self {
        Self { filters }
    }

    pub fn standard(config: &BatchConfig) -> Self {
        Self::new(vec![
            Box::new(Deduplicate),
            Box::new(DurationRange {
                min_minutes: config.min_duration_minutes,
                max_minutes: config.max_duration_minutes,
            }),
            Box::new(PositiveViews),
            Box::new(MinEngagement {
                min_like_ratio: config.min_like_ratio,
            }),
            Box::new(TargetIqr {
                multiplier: config.iqr_multiplier,
            }),
            Box::new(ChannelMedianFill),
            Box::new(SubscriberCap {
                quantile: config.subscriber_cap_quantile,
                multiplier: config.subscriber_cap_multiplier,
            }),
        ])
    }

    pub fn with_filter(mut self, filter: Box<dyn QualityFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }

    pub fn clean(&self, rows: Vec<TrainingRow>) -> Vec<TrainingRow> {
        let original = rows.len();
        let mut rows = rows;
        for filter in &self.filters {
            let before = rows.len();
            rows = filter.apply(rows);
            if before > 0 && rows.is_empty() {
                warn!(filter = filter.name(), before, "quality filter dropped every row");
            } else {
                info!(filter = filter.name(), before, after = rows.len(), "quality filter applied");
            }
        }
        info!(original, kept = rows.len(), "dataset cleaned");
        rows
    }
}
