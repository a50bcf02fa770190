//! Z-Score Normalization with Frozen Fit Statistics

use crate::NormalizeError;
use feature_schema::FeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Per-feature mean and sample standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Frozen per-feature statistics produced by one fit
///
/// Treated as read-only once produced; serializable so a later process
/// can restore the exact training-time statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    stats: BTreeMap<String, FeatureStats>,
}

impl NormalizationStats {
    /// Stats for one feature, if it was fit
    pub fn get(&self, feature: &str) -> Option<FeatureStats> {
        self.stats.get(feature).copied()
    }

    /// Number of fitted features
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Check if no features were fit
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Iterate fitted features
    pub fn iter(&self) -> impl Iterator<Item = (&str, FeatureStats)> {
        self.stats.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Z-score normalizer with an explicit unfit -> frozen lifecycle
///
/// `fit` computes reference statistics once and freezes them; every
/// subsequent `transform` consults the same frozen values. Statistics are
/// only replaced by an explicit re-fit.
#[derive(Debug, Default)]
pub struct FeatureNormalizer {
    frozen: Option<NormalizationStats>,
}

impl FeatureNormalizer {
    /// Create an unfit normalizer
    pub fn new() -> Self {
        Self { frozen: None }
    }

    /// Reconstruct a frozen normalizer from persisted statistics
    pub fn from_stats(stats: NormalizationStats) -> Self {
        info!("Restoring normalizer with {} fitted features", stats.len());
        Self {
            frozen: Some(stats),
        }
    }

    /// Whether a fit has happened
    pub fn is_fitted(&self) -> bool {
        self.frozen.is_some()
    }

    /// Frozen statistics, if fit
    pub fn stats(&self) -> Option<&NormalizationStats> {
        self.frozen.as_ref()
    }

    /// Drop frozen statistics, returning to the unfit state
    pub fn reset(&mut self) {
        self.frozen = None;
    }

    /// Fit per-feature mean/std from a reference dataset and freeze them
    ///
    /// Features named in `features` but absent from the reference schema
    /// are skipped with a warning. Calling `fit` again replaces the prior
    /// statistics wholesale.
    pub fn fit(&mut self, reference: &[FeatureVector], features: &[String]) {
        if self.frozen.is_some() {
            info!("Re-fitting normalizer; frozen statistics are replaced");
        }

        let mut stats = BTreeMap::new();
        for feature in features {
            let values: Vec<f64> = reference
                .iter()
                .filter_map(|v| v.get(feature))
                .filter(|v| v.is_finite())
                .collect();

            if values.is_empty() {
                warn!("Feature '{}' has no values in reference set; skipping", feature);
                continue;
            }

            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let std_dev = if values.len() >= 2 {
                let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
                (m2 / (n - 1.0)).sqrt()
            } else {
                0.0
            };
            stats.insert(feature.clone(), FeatureStats { mean, std_dev });
        }

        info!(
            "Fitted normalization statistics for {} of {} requested features",
            stats.len(),
            features.len()
        );
        self.frozen = Some(NormalizationStats { stats });
    }

    /// Apply the frozen z-score transform to a dataset
    ///
    /// Features with `std == 0` or never fit pass through unscaled. Each
    /// output vector is freshly built; inputs are untouched.
    pub fn transform(
        &self,
        vectors: &[FeatureVector],
        features: &[String],
    ) -> Result<Vec<FeatureVector>, NormalizeError> {
        let frozen = self.frozen.as_ref().ok_or(NormalizeError::NotFitted)?;

        let Some(first) = vectors.first() else {
            return Ok(Vec::new());
        };

        // Resolve stats per schema position once; all vectors of a batch
        // share one schema.
        let schema = first.schema();
        let mut by_position: Vec<Option<FeatureStats>> = vec![None; schema.len()];
        for feature in features {
            match schema.position(feature) {
                Some(i) => by_position[i] = frozen.get(feature),
                None => warn!("Feature '{}' not in schema; skipping", feature),
            }
        }

        debug!("Transforming {} vectors", vectors.len());
        Ok(vectors
            .iter()
            .map(|v| {
                v.map_values(|i, value| match by_position[i] {
                    Some(FeatureStats { mean, std_dev }) if std_dev > 0.0 => {
                        (value - mean) / std_dev
                    }
                    _ => value,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_schema::FeatureSchema;
    use std::sync::Arc;
    use telemetry_log::SensorChannel;

    fn vectors_of(rpms: &[f64]) -> Vec<FeatureVector> {
        let schema = Arc::new(
            FeatureSchema::builder()
                .raw_channels(&[SensorChannel::Rpm, SensorChannel::Speed])
                .build()
                .unwrap(),
        );
        rpms.iter()
            .enumerate()
            .map(|(i, &rpm)| {
                FeatureVector::new(Arc::clone(&schema), i as i64 * 2000, vec![rpm, 50.0])
            })
            .collect()
    }

    fn feature_list() -> Vec<String> {
        vec!["rpm".to_string(), "speed".to_string()]
    }

    #[test]
    fn test_transform_before_fit_is_an_error() {
        let normalizer = FeatureNormalizer::new();
        let result = normalizer.transform(&vectors_of(&[1000.0]), &feature_list());
        assert!(matches!(result, Err(NormalizeError::NotFitted)));
    }

    #[test]
    fn test_fit_then_transform_standardizes() {
        let vectors = vectors_of(&[1000.0, 2000.0, 3000.0, 4000.0, 5000.0]);
        let mut normalizer = FeatureNormalizer::new();
        normalizer.fit(&vectors, &feature_list());

        let transformed = normalizer.transform(&vectors, &feature_list()).unwrap();
        let values: Vec<f64> = transformed.iter().map(|v| v.get("rpm").unwrap()).collect();

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
        assert!(mean.abs() < 1e-9);
        assert!((var.sqrt() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_feature_passes_through() {
        let vectors = vectors_of(&[1000.0, 2000.0, 3000.0]);
        let mut normalizer = FeatureNormalizer::new();
        normalizer.fit(&vectors, &feature_list());

        // speed is constant 50 in the fixture
        let transformed = normalizer.transform(&vectors, &feature_list()).unwrap();
        for v in &transformed {
            assert_eq!(v.get("speed").unwrap(), 50.0);
        }
    }

    #[test]
    fn test_unfit_feature_passes_through() {
        let vectors = vectors_of(&[100.0, 200.0, 300.0]);
        let mut normalizer = FeatureNormalizer::new();
        normalizer.fit(&vectors, &["rpm".to_string()]);

        let transformed = normalizer.transform(&vectors, &feature_list()).unwrap();
        for (orig, out) in vectors.iter().zip(&transformed) {
            assert_eq!(out.get("speed"), orig.get("speed"));
        }
    }

    #[test]
    fn test_refit_replaces_stats() {
        let mut normalizer = FeatureNormalizer::new();
        normalizer.fit(&vectors_of(&[0.0, 10.0]), &feature_list());
        let first = normalizer.stats().unwrap().get("rpm").unwrap();

        normalizer.fit(&vectors_of(&[100.0, 200.0]), &feature_list());
        let second = normalizer.stats().unwrap().get("rpm").unwrap();
        assert_ne!(first.mean, second.mean);
    }

    #[test]
    fn test_stats_serde_roundtrip_is_exact() {
        let vectors = vectors_of(&[13.7, 29.1, 41.3]);
        let mut normalizer = FeatureNormalizer::new();
        normalizer.fit(&vectors, &feature_list());
        let stats = normalizer.stats().unwrap().clone();

        let json = serde_json::to_string(&stats).unwrap();
        let restored: NormalizationStats = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, stats);

        // A restored normalizer produces identical transforms
        let from_disk = FeatureNormalizer::from_stats(restored);
        let a = normalizer.transform(&vectors, &feature_list()).unwrap();
        let b = from_disk.transform(&vectors, &feature_list()).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.values(), y.values());
        }
    }

    #[test]
    fn test_empty_batch_transform() {
        let mut normalizer = FeatureNormalizer::new();
        normalizer.fit(&vectors_of(&[1.0, 2.0]), &feature_list());
        let out = normalizer.transform(&[], &feature_list()).unwrap();
        assert!(out.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_fitted_transform_standardizes_nonconstant_features(
                rpms in prop::collection::vec(-1.0e6..1.0e6f64, 2..64),
            ) {
                let vectors = vectors_of(&rpms);
                let mut normalizer = FeatureNormalizer::new();
                normalizer.fit(&vectors, &feature_list());
                let transformed = normalizer.transform(&vectors, &feature_list()).unwrap();

                let stats = normalizer.stats().unwrap().get("rpm").unwrap();
                let out: Vec<f64> = transformed.iter().map(|v| v.get("rpm").unwrap()).collect();
                prop_assert!(out.iter().all(|v| v.is_finite()));

                if stats.std_dev > 1e-3 {
                    let mean = out.iter().sum::<f64>() / out.len() as f64;
                    prop_assert!(mean.abs() < 1e-6);
                }
            }
        }
    }
}
