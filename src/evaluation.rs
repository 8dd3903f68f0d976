use serde::{Deserialize, Serialize};
use tracing::info;

use crate::batch::TrainingMatrix;
use crate::error::{ForecastError, Result};
use crate::model::{CvScore, ModelMetadata, Scorer};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvaluationMetrics {
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
    /// Population standard deviation of `actual - predicted`.
    pub residual_std: f64,
    pub correlation: f64,
    pub pairwise_ranking_accuracy: f64,
    pub sample_count: usize,
    #[serde(default)]
    pub feature_count: usize,
}

impl EvaluationMetrics {
    pub fn apply_to(&self, metadata: &mut ModelMetadata) {
        metadata.prediction_interval_std = Some(self.residual_std);
        if self.feature_count > 0 {
            metadata.feature_count = self.feature_count;
        }
        let entry = metadata
            .cv_scores
            .entry(metadata.model_name.clone())
            .or_insert_with(CvScore::default);
        entry.mean = self.r2;
    }
}

pub fn evaluate(scorer: &dyn Scorer, matrix: &TrainingMatrix) -> Result<EvaluationMetrics> {
    if scorer.feature_names() != matrix.schema.names() {
        return Err(ForecastError::SchemaMismatch(
            "scorer and matrix were built from different schemas".to_string(),
        ));
    }
    if matrix.is_empty() {
        return Ok(EvaluationMetrics {
            feature_count: matrix.schema.len(),
            ..EvaluationMetrics::default()
        });
    }

    let predictions = matrix
        .rows
        .iter()
        .map(|row| scorer.score(row))
        .collect::<Result<Vec<f64>>>()?;
    let metrics = EvaluationMetrics {
        feature_count: matrix.schema.len(),
        ..compute_metrics(&predictions, &matrix.targets)
    };

    info!(
        r2 = metrics.r2,
        mae = metrics.mae,
        residual_std = metrics.residual_std,
        samples = metrics.sample_count,
        "held-out evaluation complete"
    );
    Ok(metrics)
}

pub fn compute_metrics(predicted: &[f64], actual: &[f64]) -> EvaluationMetrics {
    let count = predicted.len().min(actual.len());
    if count == 0 {
        return EvaluationMetrics::default();
    }
    let predicted = &predicted[..count];
    let actual = &actual[..count];
    let n = count as f64;

    let mean_predicted = predicted.iter().sum::<f64>() / n;
    let mean_actual = actual.iter().sum::<f64>() / n;

    let mut abs_error = 0.0;
    let mut ss_res = 0.0;
    let mut residual_sum = 0.0;
    let mut cov = 0.0;
    let mut var_predicted = 0.0;
    let mut var_actual = 0.0;
    for (p, a) in predicted.iter().zip(actual) {
        let residual = a - p;
        abs_error += residual.abs();
        ss_res += residual * residual;
        residual_sum += residual;

        let dp = p - mean_predicted;
        let da = a - mean_actual;
        cov += dp * da;
        var_predicted += dp * dp;
        var_actual += da * da;
    }

    let mean_residual = residual_sum / n;
    let residual_var = (ss_res / n - mean_residual * mean_residual).max(0.0);
    let r2 = if var_actual > 0.0 { 1.0 - ss_res / var_actual } else { 0.0 };
    let correlation = if count > 1 && var_predicted > 0.0 && var_actual > 0.0 {
        cov / (var_predicted * var_actual).sqrt()
    } else {
        0.0
    };

    EvaluationMetrics {
        r2,
        mae: abs_error / n,
        rmse: (ss_res / n).sqrt(),
        residual_std: residual_var.sqrt(),
        correlation,
        pairwise_ranking_accuracy: ranking_accuracy(predicted, actual),
        sample_count: count,
        feature_count: 0,
    }
}

fn ranking_accuracy(predicted: &[f64], actual: &[f64]) -> f64 {
    let (agree, compared) = (0..predicted.len())
        .flat_map(|i| ((i + 1)..predicted.len()).map(move |j| (i, j)))
        .filter_map(|(i, j)| {
            let by_prediction = predicted[i].partial_cmp(&predicted[j])?;
            let by_actual = actual[i].partial_cmp(&actual[j])?;
            Some(by_prediction == by_actual)
        })
        .fold((0usize, 0usize), |(agree, compared), same| {
            (agree + usize::from(same), compared + 1)
        });

    if compared == 0 {
        0.0
    } else {
        agree as f64 / compared as f64
    }
}
