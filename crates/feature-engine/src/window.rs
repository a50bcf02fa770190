//! Windowed Feature Extraction

use crate::{DerivedIndexCalculator, WindowStats};
use feature_schema::{FeatureKind, FeatureSchema, FeatureVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use telemetry_log::{SensorChannel, TelemetrySample};
use tracing::debug;

/// Configuration for windowed feature extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Centered rolling window size in samples (default: 10)
    pub rolling_window: usize,
    /// Fixed sampling period in seconds (default: 2.0)
    pub sample_interval_secs: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            rolling_window: 10,
            sample_interval_secs: 2.0,
        }
    }
}

/// Computes one feature vector per sample of a sequence
///
/// Pure function of the sequence and configuration; every edge condition
/// (sequence boundaries, missing values, zero denominators) degrades to 0
/// so no NaN or infinity reaches the output.
pub struct WindowEngine {
    schema: Arc<FeatureSchema>,
    config: WindowConfig,
    derived: DerivedIndexCalculator,
}

impl WindowEngine {
    /// Create an engine for the given schema
    pub fn new(schema: Arc<FeatureSchema>, config: WindowConfig) -> Self {
        Self {
            schema,
            config,
            derived: DerivedIndexCalculator::new(),
        }
    }

    /// Schema this engine produces vectors against
    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    /// Compute feature vectors for every sample of the sequence
    ///
    /// Output length always equals input length, with index `i` of the
    /// output derived from index `i` of the input.
    pub fn compute(&self, sequence: &[TelemetrySample]) -> Vec<FeatureVector> {
        let channels = self.extract_channels(sequence);
        debug!(
            "Computing {} features over {} samples",
            self.schema.len(),
            sequence.len()
        );

        sequence
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                let values = self
                    .schema
                    .specs()
                    .iter()
                    .map(|spec| self.evaluate(spec.kind, i, sample, &channels))
                    .collect();
                FeatureVector::new(Arc::clone(&self.schema), sample.timestamp_ms, values)
            })
            .collect()
    }

    /// Extract each referenced channel once, keeping missing-ness
    fn extract_channels(
        &self,
        sequence: &[TelemetrySample],
    ) -> HashMap<SensorChannel, Vec<Option<f64>>> {
        let mut channels: HashMap<SensorChannel, Vec<Option<f64>>> = HashMap::new();
        for spec in self.schema.specs() {
            let channel = match spec.kind {
                FeatureKind::Raw(c)
                | FeatureKind::RollingMean(c)
                | FeatureKind::RollingStd(c)
                | FeatureKind::RateOfChange(c)
                | FeatureKind::Lag(c, _)
                | FeatureKind::MovingAverage(c, _) => c,
                FeatureKind::Derived(_) => continue,
            };
            channels
                .entry(channel)
                .or_insert_with(|| sequence.iter().map(|s| s.channel(channel)).collect());
        }
        channels
    }

    fn evaluate(
        &self,
        kind: FeatureKind,
        i: usize,
        sample: &TelemetrySample,
        channels: &HashMap<SensorChannel, Vec<Option<f64>>>,
    ) -> f64 {
        match kind {
            FeatureKind::Raw(c) => channels[&c][i].unwrap_or(0.0),
            FeatureKind::RollingMean(c) => self.rolling_stats(&channels[&c], i).mean,
            FeatureKind::RollingStd(c) => self.rolling_stats(&channels[&c], i).std_dev,
            FeatureKind::RateOfChange(c) => self.rate_of_change(&channels[&c], i),
            FeatureKind::Lag(c, k) => {
                if i >= k {
                    channels[&c][i - k].unwrap_or(0.0)
                } else {
                    0.0
                }
            }
            FeatureKind::MovingAverage(c, m) => self.moving_average(&channels[&c], i, m),
            FeatureKind::Derived(index) => self.derived.evaluate(index, sample),
        }
    }

    /// Symmetric window centered at `i`, clipped at sequence boundaries
    fn rolling_stats(&self, values: &[Option<f64>], i: usize) -> WindowStats {
        let half = self.config.rolling_window / 2;
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(values.len());
        WindowStats::compute(&values[start..end])
    }

    fn rate_of_change(&self, values: &[Option<f64>], i: usize) -> f64 {
        if i == 0 || self.config.sample_interval_secs <= 0.0 {
            return 0.0;
        }
        match (values[i], values[i - 1]) {
            (Some(curr), Some(prev)) => (curr - prev) / self.config.sample_interval_secs,
            _ => 0.0,
        }
    }

    /// Trailing window of `m` samples ending at `i` inclusive
    fn moving_average(&self, values: &[Option<f64>], i: usize, m: usize) -> f64 {
        let start = (i + 1).saturating_sub(m.max(1));
        WindowStats::mean_of(&values[start..=i])
    }
}
