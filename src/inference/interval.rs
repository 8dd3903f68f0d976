use serde::Serialize;

const DEFAULT_Z: f64 = 1.96;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionInterval {
    pub min: f64,
    pub max: f64,
    pub margin: f64,
}

pub fn z_score(confidence_level: f64) -> f64 {
    const LEVELS: [(f64, f64); 3] = [(0.90, 1.645), (0.95, 1.96), (0.99, 2.576)];
    LEVELS
        .iter()
        .find(|(level, _)| (level - confidence_level).abs() < 1e-9)
        .map(|(_, z)| *z)
        .unwrap_or(DEFAULT_Z)
}

pub fn estimate_interval(
    prediction: f64,
    residual_std: Option<f64>,
    confidence_level: f64,
    fallback_band: f64,
) -> PredictionInterval {
    match residual_std.filter(|std| std.is_finite() && *std > 0.0) {
        Some(std) => residual_interval(prediction, std, confidence_level),
        None => band_interval(prediction, fallback_band),
    }
}

pub fn residual_interval(prediction: f64, residual_std: f64, confidence_level: f64) -> PredictionInterval {
    let margin = z_score(confidence_level) * residual_std;
    PredictionInterval {
        min: (prediction - margin).max(0.0).trunc(),
        max: (prediction + margin).trunc(),
        margin,
    }
}

pub fn band_interval(prediction: f64, band: f64) -> PredictionInterval {
    let min = (prediction * (1.0 - band)).trunc().max(0.0);
    let max = (prediction * (1.0 + band)).trunc();
    PredictionInterval {
        min,
        max,
        margin: ((max - min) / 2.0).trunc(),
    }
}
