//! Normalization Error Types

use thiserror::Error;

/// Errors from the normalization layer
#[derive(Debug, Clone, Error)]
pub enum NormalizeError {
    /// Transform requested before any fit
    #[error("Normalizer has no fitted statistics; call fit before transform")]
    NotFitted,
}
