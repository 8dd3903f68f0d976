use crate::inference::ConfidenceInputs;
use crate::model::DEFAULT_CV_R2;

pub const CONFIDENCE_RANGE: (f64, f64) = (0.75, 0.95);
pub const BASE_CONFIDENCE_RANGE: (f64, f64) = (0.80, 0.92);
pub const ACCURACY_RANGE: (f64, f64) = (75.0, 95.0);

pub fn confidence_score(inputs: &ConfidenceInputs) -> f64 {
    let base = inputs
        .best_cv_r2
        .filter(|r2| r2.is_finite())
        .unwrap_or(DEFAULT_CV_R2)
        .clamp(BASE_CONFIDENCE_RANGE.0, BASE_CONFIDENCE_RANGE.1);

    let mut confidence = base;
    confidence += title_delta(inputs.title_length);
    confidence += duration_delta(inputs.duration_minutes);

    if (18.0..=21.0).contains(&inputs.publish_hour) {
        confidence += 0.04;
    }

    let subscribers = inputs.channel_subscribers;
    if subscribers > 1_000_000.0 {
        confidence += 0.03;
    } else if subscribers > 100_000.0 {
        confidence += 0.02;
    } else if subscribers > 10_000.0 {
        confidence += 0.01;
    } else if subscribers < 10_000.0 {
        confidence -= 0.03;
    }

    if inputs.seo_score > 0.7 {
        confidence += 0.03;
    } else if inputs.seo_score > 0.5 {
        confidence += 0.01;
    }

    if inputs.engagement_potential_score > 0.8 {
        confidence += 0.02;
    }

    bounded(confidence, CONFIDENCE_RANGE)
}

fn title_delta(title_length: f64) -> f64 {
    if (50.0..=60.0).contains(&title_length) {
        0.06
    } else if (45.0..=65.0).contains(&title_length) {
        0.03
    } else if (40.0..=70.0).contains(&title_length) {
        0.01
    } else {
        -0.04
    }
}

fn duration_delta(minutes: f64) -> f64 {
    if (10.0..=15.0).contains(&minutes) {
        0.05
    } else if (8.0..=20.0).contains(&minutes) {
        0.02
    } else if (5.0..=30.0).contains(&minutes) {
        0.01
    } else {
        -0.03
    }
}

pub fn accuracy_estimate(inputs: &ConfidenceInputs) -> f64 {
    let rubric = [
        (title_points(inputs.title_length), 25.0),
        (duration_points(inputs.duration_minutes), 20.0),
        (timing_points(inputs), 18.0),
        (channel_points(inputs.channel_subscribers), 15.0),
        (tag_points(inputs.tag_count), 10.0),
        (seo_points(inputs.seo_score), 12.0),
    ];

    let (score, max_score) = rubric
        .iter()
        .fold((0.0, 0.0), |(score, max), (points, cap)| (score + points, max + cap));

    let accuracy = if max_score > 0.0 {
        score / max_score * 100.0
    } else {
        ACCURACY_RANGE.0
    };
    bounded(accuracy, ACCURACY_RANGE)
}

fn title_points(title_length: f64) -> f64 {
    if (50.0..=60.0).contains(&title_length) {
        25.0
    } else if (45.0..=65.0).contains(&title_length) {
        18.0
    } else if (40.0..=70.0).contains(&title_length) {
        12.0
    } else if (35.0..=75.0).contains(&title_length) {
        6.0
    } else {
        0.0
    }
}

fn duration_points(minutes: f64) -> f64 {
    if (10.0..=15.0).contains(&minutes) {
        20.0
    } else if (8.0..=20.0).contains(&minutes) {
        14.0
    } else if (5.0..=30.0).contains(&minutes) {
        8.0
    } else {
        0.0
    }
}

fn timing_points(inputs: &ConfidenceInputs) -> f64 {
    let hour = inputs.publish_hour;
    if inputs.is_prime_time || (18.0..=21.0).contains(&hour) {
        18.0
    } else if (17.0..=22.0).contains(&hour) {
        12.0
    } else {
        0.0
    }
}

fn channel_points(subscribers: f64) -> f64 {
    if subscribers > 1_000_000.0 {
        15.0
    } else if subscribers > 100_000.0 {
        12.0
    } else if subscribers > 10_000.0 {
        8.0
    } else {
        0.0
    }
}

fn tag_points(tag_count: f64) -> f64 {
    if (8.0..=12.0).contains(&tag_count) {
        10.0
    } else if (5.0..=15.0).contains(&tag_count) {
        7.0
    } else if tag_count > 0.0 {
        3.0
    } else {
        0.0
    }
}

fn seo_points(seo_score: f64) -> f64 {
    if seo_score > 0.7 {
        12.0
    } else if seo_score > 0.5 {
        8.0
    } else if seo_score > 0.3 {
        4.0
    } else {
        0.0
    }
}

fn bounded(value: f64, (low, high): (f64, f64)) -> f64 {
    if value.is_nan() {
        return low;
    }
    value.clamp(low, high)
}
