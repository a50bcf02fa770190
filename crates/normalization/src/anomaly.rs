//! Batch Z-Score Anomaly Flagging

use feature_schema::FeatureVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Minimum non-missing values required before a feature is checked
pub const MIN_DETECTION_BATCH: usize = 10;

/// Flag and z-score for one feature of one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub flagged: bool,
    pub zscore: f64,
}

/// Per-sample anomaly assessment over a set of checked features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub timestamp_ms: i64,
    /// `(feature, flag)` for every checked feature, in request order
    pub features: Vec<(String, FeatureFlag)>,
    /// Fraction of checked features flagged
    pub overall_anomaly_score: f64,
    pub is_anomaly: bool,
}

/// Flags statistical outliers against fresh per-batch statistics
///
/// Statistics are a property of the batch passed in: they are computed on
/// every call (population mean/std) and never stored or reused.
#[derive(Debug, Clone, Copy)]
pub struct AnomalyDetector {
    /// Z-score magnitude above which a value is flagged
    threshold: f64,
    /// Flagged-fraction above which a sample is anomalous
    score_threshold: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            score_threshold: 0.3,
        }
    }
}

impl AnomalyDetector {
    /// Create a detector with the given z-score threshold
    pub fn new(threshold: f64, score_threshold: f64) -> Self {
        Self {
            threshold,
            score_threshold,
        }
    }

    /// Flag one feature across a batch
    ///
    /// Returns `None` (a no-op, not an error) when the feature is unknown
    /// to the batch schema or has fewer than [`MIN_DETECTION_BATCH`]
    /// usable values.
    pub fn detect(&self, batch: &[FeatureVector], feature: &str) -> Option<Vec<FeatureFlag>> {
        let first = batch.first()?;
        if !first.schema().contains(feature) {
            warn!("Feature '{}' not in batch schema; skipping detection", feature);
            return None;
        }

        let values: Vec<Option<f64>> = batch
            .iter()
            .map(|v| v.get(feature).filter(|x| x.is_finite()))
            .collect();

        let valid: Vec<f64> = values.iter().filter_map(|v| *v).collect();
        if valid.len() < MIN_DETECTION_BATCH {
            debug!(
                "Feature '{}' has {} values (< {}); detection is a no-op",
                feature,
                valid.len(),
                MIN_DETECTION_BATCH
            );
            return None;
        }

        let n = valid.len() as f64;
        let mean = valid.iter().sum::<f64>() / n;
        let std_dev = (valid.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n).sqrt();

        Some(
            values
                .iter()
                .map(|maybe| {
                    let zscore = match maybe {
                        Some(v) if std_dev > 0.0 => (v - mean) / std_dev,
                        _ => 0.0,
                    };
                    FeatureFlag {
                        flagged: zscore.abs() > self.threshold,
                        zscore,
                    }
                })
                .collect(),
        )
    }

    /// Assess every sample of a batch over a fixed checked-feature set
    ///
    /// Features that were no-ops (unknown or under-populated) do not count
    /// toward the checked total.
    pub fn score(&self, batch: &[FeatureVector], features: &[String]) -> Vec<AnomalyReport> {
        let mut per_feature: Vec<(String, Vec<FeatureFlag>)> = Vec::new();
        for feature in features {
            if let Some(flags) = self.detect(batch, feature) {
                per_feature.push((feature.clone(), flags));
            }
        }

        batch
            .iter()
            .enumerate()
            .map(|(i, vector)| {
                let features: Vec<(String, FeatureFlag)> = per_feature
                    .iter()
                    .map(|(name, flags)| (name.clone(), flags[i]))
                    .collect();
                let checked = features.len();
                let flagged = features.iter().filter(|(_, f)| f.flagged).count();
                let overall_anomaly_score = if checked > 0 {
                    flagged as f64 / checked as f64
                } else {
                    0.0
                };
                AnomalyReport {
                    timestamp_ms: vector.timestamp_ms(),
                    features,
                    overall_anomaly_score,
                    is_anomaly: overall_anomaly_score > self.score_threshold,
                }
            })
            .collect()
    }
}
