//! Feature Engineering Engine
//!
//! Provides windowed statistical features (rolling mean/std, rate of
//! change, lags, moving averages) and single-sample derived indices for
//! telemetry sequences.

mod derived;
mod stats;
mod window;

pub use derived::DerivedIndexCalculator;
pub use stats::WindowStats;
pub use window::{WindowConfig, WindowEngine};
