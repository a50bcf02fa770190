//! Normalization and Statistical Validation
//!
//! Provides z-score normalization with frozen fit statistics, batch
//! anomaly flagging, and feature quality reports for engineered datasets.

mod anomaly;
mod error;
mod normalizer;
mod quality;

pub use anomaly::{AnomalyDetector, AnomalyReport, FeatureFlag, MIN_DETECTION_BATCH};
pub use error::NormalizeError;
pub use normalizer::{FeatureNormalizer, FeatureStats, NormalizationStats};
pub use quality::{FeatureQuality, QualityReport};
