use serde::Serialize;

use crate::inference::ConfidenceInputs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Title,
    Timing,
    Duration,
    Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub message: String,
    pub suggestion: String,
}

impl Recommendation {
    fn new(kind: RecommendationKind, priority: Priority, message: &str, suggestion: &str) -> Self {
        Self {
            kind,
            priority,
            message: message.to_string(),
            suggestion: suggestion.to_string(),
        }
    }
}

const PRIME_TIME_START: u8 = 18;
const PRIME_TIME_END: u8 = 21;

pub fn build_recommendations(inputs: &ConfidenceInputs) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if inputs.title_length < 50.0 {
        recommendations.push(Recommendation::new(
            RecommendationKind::Title,
            Priority::High,
            "Lengthening the title to 50-60 characters can bring 15-20% more views.",
            "Add more descriptive words to the title",
        ));
    } else if inputs.title_length > 70.0 {
        recommendations.push(Recommendation::new(
            RecommendationKind::Title,
            Priority::Medium,
            "Trimming the title to 50-60 characters can earn more clicks.",
            "Shorten the title and drop filler words",
        ));
    }

    if !inputs.title_has_number {
        recommendations.push(Recommendation::new(
            RecommendationKind::Title,
            Priority::Medium,
            "Adding a number to the title (e.g. \"10 Tips\", \"5 Ways\") can earn about 12% more clicks.",
            "Add a number to the title",
        ));
    }

    if !inputs.title_has_question_framing {
        recommendations.push(Recommendation::new(
            RecommendationKind::Title,
            Priority::Low,
            "Question-style titles spark 10-15% more curiosity.",
            "Rephrase the title as a question",
        ));
    }

    let hour = inputs.publish_hour;
    if !(f64::from(PRIME_TIME_START)..=f64::from(PRIME_TIME_END)).contains(&hour) {
        let target = PRIME_TIME_START + (PRIME_TIME_END - PRIME_TIME_START) / 2;
        recommendations.push(Recommendation {
            kind: RecommendationKind::Timing,
            priority: Priority::High,
            message: format!(
                "Publishing in prime time ({}:00-{}:00) can bring 20-25% more views.",
                PRIME_TIME_START, PRIME_TIME_END
            ),
            suggestion: format!("Move the publish time to {}:00", target),
        });
    }

    if inputs.duration_minutes < 5.0 {
        recommendations.push(Recommendation::new(
            RecommendationKind::Duration,
            Priority::Medium,
            "Videos of 5-15 minutes have the highest engagement rate.",
            "Extend the video to 10-12 minutes",
        ));
    } else if inputs.duration_minutes > 30.0 {
        recommendations.push(Recommendation::new(
            RecommendationKind::Duration,
            Priority::Low,
            "Videos of 10-15 minutes perform best.",
            "Cut the video down to 12-15 minutes",
        ));
    }

    if inputs.channel_subscribers < 10_000.0 {
        recommendations.push(Recommendation::new(
            RecommendationKind::Channel,
            Priority::Low,
            "Regular uploads and SEO work matter most for growing a channel.",
            "Upload at least 2-3 videos per week",
        ));
    }

    recommendations
}
