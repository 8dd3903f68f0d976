use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::error::{ForecastError, Result};
use crate::features::channel::POST_PUBLISH_FEATURES;
use crate::features::FeatureBag;

pub const MISSING_FEATURE_DEFAULT: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CanonicalFeatureSchema {
    names: Vec<String>,
}

impl CanonicalFeatureSchema {
    pub fn new(names: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ForecastError::SchemaMismatch(format!(
                    "duplicate feature name: {}",
                    name
                )));
            }
        }
        Ok(Self { names })
    }

    /// Sorted union of numeric keys across all bags, minus the post-publish
    /// keys serving can never fill.
    pub fn from_bags<'a>(bags: impl IntoIterator<Item = &'a FeatureBag>) -> Self {
        let mut names = BTreeSet::new();
        for bag in bags {
            names.extend(
                bag.numeric()
                    .keys()
                    .filter(|name| !POST_PUBLISH_FEATURES.contains(&name.as_str()))
                    .cloned(),
            );
        }
        Self {
            names: names.into_iter().collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for name in &self.names {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|err| ForecastError::io(path, err))?;
        serde_json::from_str(&data).map_err(|err| ForecastError::parse("feature schema", err))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| ForecastError::io(parent, err))?;
        }
        let payload = serde_json::to_string_pretty(&self.names)
            .map_err(|err| ForecastError::parse("feature schema", err))?;
        std::fs::write(path, payload).map_err(|err| ForecastError::io(path, err))
    }
}

impl TryFrom<Vec<String>> for CanonicalFeatureSchema {
    type Error = ForecastError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        CanonicalFeatureSchema::new(names)
    }
}

impl From<CanonicalFeatureSchema> for Vec<String> {
    fn from(schema: CanonicalFeatureSchema) -> Self {
        schema.names
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values.into_iter().map(finite_or_zero).collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub vector: FeatureVector,
    /// Schema names the bag did not carry, defaulted to 0.0.
    pub missing: Vec<String>,
    pub ignored: usize,
}

pub fn assemble_vector(bag: &FeatureBag, schema: &CanonicalFeatureSchema) -> FeatureVector {
    assemble_with_report(bag, schema).vector
}

pub fn assemble_with_report(bag: &FeatureBag, schema: &CanonicalFeatureSchema) -> Assembly {
    let mut values = Vec::with_capacity(schema.len());
    let mut missing = Vec::new();
    let mut used = 0usize;

    for name in schema.names() {
        match bag.get(name) {
            Some(value) => {
                used += 1;
                values.push(finite_or_zero(value));
            }
            None => {
                missing.push(name.clone());
                values.push(MISSING_FEATURE_DEFAULT);
            }
        }
    }

    Assembly {
        vector: FeatureVector(values),
        missing,
        ignored: bag.numeric().len().saturating_sub(used),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
