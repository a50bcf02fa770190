//! Feature Quality Validation

use feature_schema::FeatureVector;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Quality findings for a single feature across a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureQuality {
    pub name: String,
    /// Count of NaN or infinite values
    pub non_finite: usize,
    /// Every value identical
    pub constant: bool,
    /// Every value exactly zero
    pub all_zero: bool,
}

impl FeatureQuality {
    /// Whether this feature carries usable signal
    pub fn degenerate(&self) -> bool {
        self.non_finite > 0 || self.constant || self.all_zero
    }
}

/// Dataset-level quality report produced after normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub sample_count: usize,
    pub features: Vec<FeatureQuality>,
    /// False when any feature has non-finite values
    pub passed: bool,
}

impl QualityReport {
    /// Assess every schema feature of a dataset
    pub fn assess(vectors: &[FeatureVector]) -> Self {
        let Some(first) = vectors.first() else {
            return Self {
                sample_count: 0,
                features: Vec::new(),
                passed: true,
            };
        };

        let schema = first.schema();
        let features: Vec<FeatureQuality> = schema
            .names()
            .enumerate()
            .map(|(i, name)| {
                let mut non_finite = 0;
                let mut all_zero = true;
                let mut constant = true;
                let reference = vectors[0].value_at(i);
                for v in vectors {
                    let value = v.value_at(i);
                    if !value.is_finite() {
                        non_finite += 1;
                    }
                    if value != 0.0 {
                        all_zero = false;
                    }
                    if value != reference {
                        constant = false;
                    }
                }
                FeatureQuality {
                    name: name.to_string(),
                    non_finite,
                    constant,
                    all_zero,
                }
            })
            .collect();

        let passed = features.iter().all(|f| f.non_finite == 0);
        for feature in features.iter().filter(|f| f.degenerate()) {
            warn!(
                "Degenerate feature '{}' (non_finite={}, constant={}, all_zero={})",
                feature.name, feature.non_finite, feature.constant, feature.all_zero
            );
        }

        Self {
            sample_count: vectors.len(),
            features,
            passed,
        }
    }

    /// Names of features flagged as degenerate
    pub fn degenerate_features(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| f.degenerate())
            .map(|f| f.name.as_str())
            .collect()
    }
}
