//! Pipeline Configuration

use serde::{Deserialize, Serialize};

/// Configuration for the feature pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Centered rolling window size in samples (default: 10)
    pub rolling_window: usize,
    /// Fixed sampling period in seconds (default: 2.0)
    pub sample_interval_secs: f64,
    /// Training batches below this size are synthetically augmented
    pub min_training_samples: usize,
    /// Recent-window size for real-time collection (default: 50)
    pub realtime_window: usize,
    /// Z-score magnitude for anomaly flagging (default: 3.0)
    pub anomaly_threshold: f64,
    /// Flagged-fraction above which a sample is anomalous (default: 0.3)
    pub anomaly_score_threshold: f64,
    /// Seed for the synthetic augmentation generator
    pub synth_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rolling_window: 10,
            sample_interval_secs: 2.0,
            min_training_samples: 1000,
            realtime_window: 50,
            anomaly_threshold: 3.0,
            anomaly_score_threshold: 0.3,
            synth_seed: 42,
        }
    }
}
