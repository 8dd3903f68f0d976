use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::assembly::{assemble_vector, CanonicalFeatureSchema, FeatureVector};
use crate::batch::TrainingRow;
use crate::error::{ForecastError, Result};
use crate::features::FeatureBag;

pub const SCHEMA_FILE: &str = "feature_names.json";
pub const MATRIX_FILE: &str = "training_matrix.jsonl";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MatrixLine {
    video_id: String,
    target: f64,
    features: FeatureVector,
}

#[derive(Debug, Clone)]
pub struct TrainingMatrix {
    pub schema: CanonicalFeatureSchema,
    pub video_ids: Vec<String>,
    pub rows: Vec<FeatureVector>,
    pub targets: Vec<f64>,
}

impl TrainingMatrix {
    pub fn build(rows: &[TrainingRow], now: NaiveDateTime) -> Self {
        let bags = engineer_rows(rows, now);
        let schema = CanonicalFeatureSchema::from_bags(bags.iter());
        Self::assemble(rows, &bags, schema)
    }

    pub fn build_with_schema(rows: &[TrainingRow], schema: CanonicalFeatureSchema, now: NaiveDateTime) -> Self {
        let bags = engineer_rows(rows, now);
        Self::assemble(rows, &bags, schema)
    }

    fn assemble(rows: &[TrainingRow], bags: &[FeatureBag], schema: CanonicalFeatureSchema) -> Self {
        let vectors: Vec<FeatureVector> = bags
            .par_iter()
            .map(|bag| assemble_vector(bag, &schema))
            .collect();

        info!(
            rows = vectors.len(),
            features = schema.len(),
            fingerprint = %schema.fingerprint(),
            "training matrix assembled"
        );

        Self {
            schema,
            video_ids: rows.iter().map(|row| row.video_id.clone()).collect(),
            rows: vectors,
            targets: rows.iter().map(|row| row.target_first_week_views).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|err| ForecastError::io(dir, err))?;
        self.schema.write(&dir.join(SCHEMA_FILE))?;

        let path = dir.join(MATRIX_FILE);
        let file = std::fs::File::create(&path).map_err(|err| ForecastError::io(&path, err))?;
        let mut writer = BufWriter::new(file);
        for ((video_id, features), target) in self.video_ids.iter().zip(&self.rows).zip(&self.targets) {
            let line = MatrixLine {
                video_id: video_id.clone(),
                target: *target,
                features: features.clone(),
            };
            let payload =
                serde_json::to_string(&line).map_err(|err| ForecastError::parse("matrix row", err))?;
            writeln!(writer, "{}", payload).map_err(|err| ForecastError::io(&path, err))?;
        }
        writer.flush().map_err(|err| ForecastError::io(&path, err))
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let schema = CanonicalFeatureSchema::load(&dir.join(SCHEMA_FILE))?;
        let path = dir.join(MATRIX_FILE);
        let file = std::fs::File::open(&path).map_err(|err| ForecastError::io(&path, err))?;

        let mut video_ids = Vec::new();
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|err| ForecastError::io(&path, err))?;
            if line.trim().is_empty() {
                continue;
            }
            let parsed: MatrixLine =
                serde_json::from_str(&line).map_err(|err| ForecastError::parse("matrix row", err))?;
            if parsed.features.len() != schema.len() {
                return Err(ForecastError::SchemaMismatch(format!(
                    "row {} has {} values, schema has {}",
                    parsed.video_id,
                    parsed.features.len(),
                    schema.len()
                )));
            }
            video_ids.push(parsed.video_id);
            rows.push(parsed.features);
            targets.push(parsed.target);
        }

        Ok(Self {
            schema,
            video_ids,
            rows,
            targets,
        })
    }
}

fn engineer_rows(rows: &[TrainingRow], now: NaiveDateTime) -> Vec<FeatureBag> {
    rows.par_iter().map(|row| row.engineer(now)).collect()
}
