//! Telemetry Sample Log
//!
//! Provides the raw sample types, an in-memory telemetry store, and a
//! scenario-driven synthetic sample generator for training augmentation.

mod sample;
mod store;
mod synth;

pub use sample::{OperatingMode, SensorChannel, TelemetrySample, VehicleClass};
pub use store::{StoreError, TelemetryStore};
pub use synth::SyntheticGenerator;
