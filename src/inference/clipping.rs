use serde::Serialize;

pub const MIN_PREDICTION_FLOOR: f64 = 50.0;
pub const VIRAL_HEADROOM: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClipBounds {
    pub min_ratio: f64,
    pub max_ratio: f64,
    pub min_prediction: f64,
    pub max_prediction: f64,
}

impl ClipBounds {
    pub fn ratios(subscribers: f64) -> (f64, f64) {
        if subscribers < 10_000.0 {
            (0.02, 0.20)
        } else if subscribers < 100_000.0 {
            (0.01, 0.15)
        } else if subscribers < 1_000_000.0 {
            (0.005, 0.10)
        } else {
            (0.002, 0.05)
        }
    }

    pub fn for_subscribers(subscribers: f64) -> Self {
        let subscribers = if subscribers.is_finite() {
            subscribers.max(0.0)
        } else {
            0.0
        };
        let (min_ratio, max_ratio) = Self::ratios(subscribers);
        let min_prediction = MIN_PREDICTION_FLOOR.max((subscribers * min_ratio).trunc());
        // Tiny channels have a ceiling under the floor; the floor wins.
        let max_prediction = (subscribers * max_ratio * VIRAL_HEADROOM)
            .trunc()
            .max(min_prediction);

        Self {
            min_ratio,
            max_ratio,
            min_prediction,
            max_prediction,
        }
    }

    /// Truncates toward zero, clamps into the bracket, floors at 0.
    /// NaN scores land on the floor.
    pub fn clip(&self, raw_score: f64) -> f64 {
        let raw = if raw_score.is_nan() {
            self.min_prediction
        } else {
            raw_score.trunc()
        };
        raw.clamp(self.min_prediction, self.max_prediction).max(0.0)
    }
}
