use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::f64::consts::PI;
use tracing::warn;

use crate::features::FeatureBag;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn from_hour(hour: u8) -> Self {
        if hour <= 6 {
            TimeOfDay::Night
        } else if hour <= 12 {
            TimeOfDay::Morning
        } else if hour <= 18 {
            TimeOfDay::Afternoon
        } else {
            TimeOfDay::Evening
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Night => "night",
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PublishTime {
    pub timestamp: NaiveDateTime,
    pub hour: u8,
    pub recovered: bool,
}

pub fn resolve_publish_time(raw: Option<&str>, hour: Option<u8>, now: NaiveDateTime) -> PublishTime {
    let parsed = raw.and_then(parse_timestamp);
    if parsed.is_none() {
        if let Some(value) = raw.filter(|value| !value.trim().is_empty()) {
            warn!(value, "unparseable publish timestamp, using current time");
        }
    }

    let recovered = parsed.is_none();
    let base = parsed.unwrap_or(now);
    let hour = hour.map(|h| h.min(23)).unwrap_or(base.hour() as u8);
    let timestamp = base.with_hour(hour as u32).unwrap_or(base);

    PublishTime {
        timestamp,
        hour,
        recovered,
    }
}

/// Accepts RFC 3339 (offset kept as wall-clock time), naive ISO date-times
/// with `T` or space separators, and bare dates at midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[derive(Debug, Clone)]
pub struct TemporalFeatures {
    pub hour: u8,
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: u32,
    pub day_name: &'static str,
    pub is_weekend: bool,
    pub day_of_month: u32,
    pub week_of_year: u32,
    pub month: u32,
    pub quarter: u32,
    pub is_month_end: bool,
    pub is_month_start: bool,
    pub is_prime_time: bool,
    pub time_of_day: TimeOfDay,
}

impl TemporalFeatures {
    pub fn write_into(&self, bag: &mut FeatureBag) {
        let hour = self.hour as f64;
        let dow = self.day_of_week as f64;

        bag.set("publish_hour", hour);
        bag.set("publish_day_of_week", dow);
        bag.set("publish_day_of_month", self.day_of_month as f64);
        bag.set("publish_week_of_year", self.week_of_year as f64);
        bag.set("publish_month", self.month as f64);
        bag.set("publish_quarter", self.quarter as f64);
        bag.set_flag("is_weekend", self.is_weekend);
        bag.set_flag("is_month_end", self.is_month_end);
        bag.set_flag("is_month_start", self.is_month_start);
        bag.set_flag("is_prime_time", self.is_prime_time);

        bag.set("publish_hour_squared", hour * hour);
        bag.set("publish_hour_sin", (2.0 * PI * hour / 24.0).sin());
        bag.set("publish_hour_cos", (2.0 * PI * hour / 24.0).cos());
        bag.set("publish_day_of_week_sin", (2.0 * PI * dow / 7.0).sin());
        bag.set("publish_day_of_week_cos", (2.0 * PI * dow / 7.0).cos());

        bag.set_category("publish_day", self.day_name);
        bag.set_category("time_of_day", self.time_of_day.label());
    }
}

pub fn encode_temporal(publish: &PublishTime) -> TemporalFeatures {
    let date = publish.timestamp.date();
    let day_of_week = date.weekday().num_days_from_monday();
    let day_of_month = date.day();
    let month = date.month();

    TemporalFeatures {
        hour: publish.hour,
        day_of_week,
        day_name: DAY_NAMES[day_of_week as usize],
        is_weekend: day_of_week >= 5,
        day_of_month,
        week_of_year: date.iso_week().week(),
        month,
        quarter: (month - 1) / 3 + 1,
        is_month_end: day_of_month > 25,
        is_month_start: day_of_month <= 7,
        is_prime_time: (18..=21).contains(&publish.hour),
        time_of_day: TimeOfDay::from_hour(publish.hour),
    }
}
