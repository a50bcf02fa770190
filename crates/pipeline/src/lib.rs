//! Pipeline Orchestration
//!
//! Sequences collection, feature engineering, normalization, and
//! validation for both training and real-time modes, guaranteeing
//! identical feature ordering and identical normalization statistics
//! between the two.

mod config;
mod error;
mod orchestrator;
mod source;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use orchestrator::{Pipeline, PipelineState, TrainingOutput};
pub use source::SampleSource;
