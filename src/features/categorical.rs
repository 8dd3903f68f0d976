use crate::features::FeatureBag;

#[derive(Debug, Clone, Copy)]
pub struct CategoricalField {
    pub name: &'static str,
    pub levels: &'static [&'static str],
}

impl CategoricalField {
    pub fn reference(&self) -> &'static str {
        self.levels[0]
    }

    pub fn indicator_name(&self, level: &str) -> String {
        format!("{}_{}", self.name, level)
    }

    pub fn indicator_names(&self) -> Vec<String> {
        self.levels[1..]
            .iter()
            .map(|level| self.indicator_name(level))
            .collect()
    }

    /// Writes one indicator per non-reference level. A missing or unknown
    /// value encodes as the reference level (all zeros).
    pub fn encode(&self, value: Option<&str>, bag: &mut FeatureBag) {
        for level in &self.levels[1..] {
            bag.set_flag(&self.indicator_name(level), value == Some(*level));
        }
    }
}

pub const CATEGORICAL_FIELDS: [CategoricalField; 4] = [
    CategoricalField {
        name: "publish_day",
        levels: &[
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ],
    },
    CategoricalField {
        name: "time_of_day",
        levels: &["morning", "afternoon", "evening", "night"],
    },
    CategoricalField {
        name: "duration_category",
        levels: &["very_short", "short", "medium", "long", "very_long", "extended"],
    },
    CategoricalField {
        name: "channel_size",
        levels: &["small", "medium", "large", "mega"],
    },
];

pub fn encode_categoricals(bag: &mut FeatureBag) {
    for field in &CATEGORICAL_FIELDS {
        let value = bag.category(field.name).map(str::to_string);
        field.encode(value.as_deref(), bag);
    }
}

pub fn one_hot_feature_names() -> Vec<String> {
    CATEGORICAL_FIELDS
        .iter()
        .flat_map(CategoricalField::indicator_names)
        .collect()
}
