//! Pipeline Error Types

use normalization::NormalizeError;
use telemetry_log::StoreError;
use thiserror::Error;

/// Errors surfaced to the pipeline's caller
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Operation requires a prior successful initialize
    #[error("Pipeline is not initialized")]
    NotInitialized,

    /// Real-time transform requested before any training fit
    #[error("Normalization statistics missing: {0}")]
    NotFitted(#[from] NormalizeError),

    /// Collaborator returned zero rows where no fallback exists
    #[error("No data available: {0}")]
    NoData(String),

    /// Collaborator read failed
    #[error("Store read failed: {0}")]
    Store(#[from] StoreError),
}
