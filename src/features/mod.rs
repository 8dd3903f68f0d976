pub mod categorical;
pub mod channel;
pub mod content;
pub mod derived;
pub mod duration;
pub mod temporal;
pub mod title;

use serde::Serialize;
use std::collections::BTreeMap;

pub use categorical::{encode_categoricals, CategoricalField, CATEGORICAL_FIELDS};
pub use channel::{ChannelFeatures, ChannelSize, EngagementRates};
pub use content::ContentFeatures;
pub use derived::CompositeScores;
pub use duration::{DurationCategory, DurationFeatures};
pub use temporal::{PublishTime, TemporalFeatures, TimeOfDay};
pub use title::{TitleFeatures, TitleLexicon};

#[derive(Debug, Clone)]
pub struct EncodedRecord {
    pub title: TitleFeatures,
    pub lexicon: TitleLexicon,
    pub temporal: TemporalFeatures,
    pub duration: DurationFeatures,
    pub channel: ChannelFeatures,
    pub content: ContentFeatures,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeatureBag {
    numeric: BTreeMap<String, f64>,
    categorical: BTreeMap<String, String>,
}

impl FeatureBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a numeric feature. Keys are write-once across the whole bag.
    pub fn set(&mut self, name: &str, value: f64) {
        debug_assert!(
            !self.categorical.contains_key(name),
            "feature {name} already written as categorical"
        );
        let previous = self.numeric.insert(name.to_string(), value);
        debug_assert!(previous.is_none(), "feature {name} written twice");
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.set(name, flag(value));
    }

    pub fn set_category(&mut self, name: &str, level: &str) {
        debug_assert!(
            !self.numeric.contains_key(name),
            "feature {name} already written as numeric"
        );
        let previous = self.categorical.insert(name.to_string(), level.to_string());
        debug_assert!(previous.is_none(), "category {name} written twice");
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.numeric.get(name).copied()
    }

    pub fn get_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).unwrap_or(default)
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        self.categorical.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.numeric.contains_key(name) || self.categorical.contains_key(name)
    }

    pub fn numeric(&self) -> &BTreeMap<String, f64> {
        &self.numeric
    }

    pub fn categorical(&self) -> &BTreeMap<String, String> {
        &self.categorical
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }

    pub fn sanitize_numeric(&mut self) -> usize {
        let mut replaced = 0usize;
        for value in self.numeric.values_mut() {
            if !value.is_finite() {
                *value = 0.0;
                replaced += 1;
            }
        }
        replaced
    }
}

pub(crate) fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
