use crate::features::FeatureBag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationCategory {
    VeryShort,
    Short,
    Medium,
    Long,
    VeryLong,
    Extended,
}

impl DurationCategory {
    pub fn from_minutes(minutes: f64) -> Self {
        if minutes <= 5.0 {
            DurationCategory::VeryShort
        } else if minutes <= 10.0 {
            DurationCategory::Short
        } else if minutes <= 15.0 {
            DurationCategory::Medium
        } else if minutes <= 30.0 {
            DurationCategory::Long
        } else if minutes <= 60.0 {
            DurationCategory::VeryLong
        } else {
            DurationCategory::Extended
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationCategory::VeryShort => "very_short",
            DurationCategory::Short => "short",
            DurationCategory::Medium => "medium",
            DurationCategory::Long => "long",
            DurationCategory::VeryLong => "very_long",
            DurationCategory::Extended => "extended",
        }
    }
}

/// Binary flags and the categorical bucket intentionally disagree at the
/// edges: flags use `<5`, `5..=15`, `>15`; the bucket is right-inclusive.
#[derive(Debug, Clone)]
pub struct DurationFeatures {
    pub seconds: f64,
    pub minutes: f64,
    pub is_short: bool,
    pub is_medium: bool,
    pub is_long: bool,
    pub category: DurationCategory,
}

impl DurationFeatures {
    pub fn from_seconds(seconds: f64) -> Self {
        let seconds = if seconds.is_finite() { seconds } else { 0.0 };
        Self::from_minutes(seconds / 60.0)
    }

    pub fn from_minutes(minutes: f64) -> Self {
        let minutes = if minutes.is_finite() { minutes } else { 0.0 };
        Self {
            seconds: minutes * 60.0,
            minutes,
            is_short: minutes < 5.0,
            is_medium: (5.0..=15.0).contains(&minutes),
            is_long: minutes > 15.0,
            category: DurationCategory::from_minutes(minutes),
        }
    }

    pub fn write_into(&self, bag: &mut FeatureBag) {
        bag.set("duration_seconds", self.seconds);
        bag.set("duration_minutes", self.minutes);
        bag.set_flag("is_short_video", self.is_short);
        bag.set_flag("is_medium_video", self.is_medium);
        bag.set_flag("is_long_video", self.is_long);
        bag.set_category("duration_category", self.category.label());
    }
}
