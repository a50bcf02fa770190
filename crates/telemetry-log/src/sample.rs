//! Raw Telemetry Sample Types

use serde::{Deserialize, Serialize};

/// Operating mode tag attached to a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatingMode {
    /// Engine running, vehicle stationary
    Idle,
    /// Stop-and-go urban driving
    City,
    /// Sustained cruise
    Highway,
}

impl OperatingMode {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingMode::Idle => "idle",
            OperatingMode::City => "city",
            OperatingMode::Highway => "highway",
        }
    }
}

/// Vehicle class tag attached to a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleClass {
    Sedan,
    Suv,
    Truck,
    Van,
}

impl VehicleClass {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Sedan => "sedan",
            VehicleClass::Suv => "suv",
            VehicleClass::Truck => "truck",
            VehicleClass::Van => "van",
        }
    }
}

/// Numeric sensor channel of a telemetry sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorChannel {
    Rpm,
    Speed,
    CoolantTemp,
    ThrottlePosition,
    EngineLoad,
    FuelPressure,
    ManifoldPressure,
    IntakeAirTemp,
}

impl SensorChannel {
    /// All channels in declaration order
    pub const ALL: [SensorChannel; 8] = [
        SensorChannel::Rpm,
        SensorChannel::Speed,
        SensorChannel::CoolantTemp,
        SensorChannel::ThrottlePosition,
        SensorChannel::EngineLoad,
        SensorChannel::FuelPressure,
        SensorChannel::ManifoldPressure,
        SensorChannel::IntakeAirTemp,
    ];

    /// Channel name used in feature identifiers
    pub fn name(&self) -> &'static str {
        match self {
            SensorChannel::Rpm => "rpm",
            SensorChannel::Speed => "speed",
            SensorChannel::CoolantTemp => "coolant_temp",
            SensorChannel::ThrottlePosition => "throttle_position",
            SensorChannel::EngineLoad => "engine_load",
            SensorChannel::FuelPressure => "fuel_pressure",
            SensorChannel::ManifoldPressure => "manifold_pressure",
            SensorChannel::IntakeAirTemp => "intake_air_temp",
        }
    }
}

/// One raw sensor reading from the vehicle bus
///
/// Numeric channels are `None` when the source reported a missing or
/// non-numeric value. NaN values are treated as missing by the accessors
/// so they never reach downstream arithmetic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Epoch milliseconds, monotonic within a sequence
    pub timestamp_ms: i64,
    pub rpm: Option<f64>,
    pub speed: Option<f64>,
    pub coolant_temp: Option<f64>,
    pub throttle_position: Option<f64>,
    pub engine_load: Option<f64>,
    pub fuel_pressure: Option<f64>,
    pub manifold_pressure: Option<f64>,
    pub intake_air_temp: Option<f64>,
    pub operating_mode: Option<OperatingMode>,
    pub vehicle_class: Option<VehicleClass>,
    pub fault_label: Option<String>,
}

impl TelemetrySample {
    /// Read a channel, treating NaN and infinities as missing
    pub fn channel(&self, channel: SensorChannel) -> Option<f64> {
        let raw = match channel {
            SensorChannel::Rpm => self.rpm,
            SensorChannel::Speed => self.speed,
            SensorChannel::CoolantTemp => self.coolant_temp,
            SensorChannel::ThrottlePosition => self.throttle_position,
            SensorChannel::EngineLoad => self.engine_load,
            SensorChannel::FuelPressure => self.fuel_pressure,
            SensorChannel::ManifoldPressure => self.manifold_pressure,
            SensorChannel::IntakeAirTemp => self.intake_air_temp,
        };
        raw.filter(|v| v.is_finite())
    }

    /// Read a channel with missing values coerced to zero
    pub fn channel_or_zero(&self, channel: SensorChannel) -> f64 {
        self.channel(channel).unwrap_or(0.0)
    }
}
