//! Derived Index Calculation

use chrono::{Datelike, TimeZone, Timelike, Utc, Weekday};
use feature_schema::DerivedIndex;
use telemetry_log::{SensorChannel, TelemetrySample, VehicleClass};

/// Curb weight in kg for an unknown or untagged vehicle class
const DEFAULT_CLASS_WEIGHT_KG: f64 = 1800.0;

fn class_weight_kg(class: Option<VehicleClass>) -> f64 {
    match class {
        Some(VehicleClass::Sedan) => 1500.0,
        Some(VehicleClass::Suv) => 2200.0,
        Some(VehicleClass::Truck) => 3500.0,
        Some(VehicleClass::Van) => 2600.0,
        None => DEFAULT_CLASS_WEIGHT_KG,
    }
}

/// Computes single-sample efficiency, stress, and health indices
///
/// All indices are pure functions of one sample plus the static
/// class-weight table; missing inputs read as zero and every output is
/// clamped to a finite value.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivedIndexCalculator;

impl DerivedIndexCalculator {
    /// Create a calculator
    pub fn new() -> Self {
        Self
    }

    /// Evaluate one derived index for one sample
    pub fn evaluate(&self, index: DerivedIndex, sample: &TelemetrySample) -> f64 {
        let rpm = sample.channel_or_zero(SensorChannel::Rpm);
        let speed = sample.channel_or_zero(SensorChannel::Speed);
        let coolant = sample.channel_or_zero(SensorChannel::CoolantTemp);
        let throttle = sample.channel_or_zero(SensorChannel::ThrottlePosition);
        let load = sample.channel_or_zero(SensorChannel::EngineLoad);

        match index {
            DerivedIndex::PowerToWeight => {
                (rpm * load / 1000.0) / class_weight_kg(sample.vehicle_class)
            }
            DerivedIndex::FuelEfficiency => {
                let speed_score = (1.0 - (speed - 60.0).abs() / 60.0).max(0.0);
                let load_score = 1.0 - load / 100.0;
                let throttle_score = 1.0 - throttle / 100.0;
                (speed_score + load_score + throttle_score) / 3.0
            }
            DerivedIndex::EngineStress => {
                let rpm_stress = (rpm / 6000.0).min(1.0);
                let load_stress = load / 100.0;
                let temp_stress = ((coolant - 90.0) / 30.0).max(0.0);
                ((rpm_stress + load_stress + temp_stress) / 3.0).min(1.0)
            }
            DerivedIndex::CoolingHealth => (1.0 - (coolant - 85.0).abs() / 50.0).max(0.0),
            DerivedIndex::FuelSystemHealth => {
                let pressure = sample.channel_or_zero(SensorChannel::FuelPressure);
                let manifold = sample.channel_or_zero(SensorChannel::ManifoldPressure);
                let pressure_score = (1.0 - (pressure - 45.0).abs() / 45.0).max(0.0);
                let manifold_score = if manifold > 20.0 { 1.0 } else { 0.5 };
                (pressure_score + manifold_score) / 2.0
            }
            DerivedIndex::EnginePower => {
                let manifold = sample.channel_or_zero(SensorChannel::ManifoldPressure);
                (rpm * manifold / 10_000.0) * (load / 100.0)
            }
            DerivedIndex::TransmissionLoad => {
                let ratio = if speed > 0.0 { rpm / speed } else { 0.0 };
                ratio * (throttle / 100.0)
            }
            DerivedIndex::ThrottleResponse => {
                (1.0 - (load - 0.8 * throttle).abs() / 100.0).max(0.0)
            }
            DerivedIndex::AmbientTempDiff => {
                sample.channel_or_zero(SensorChannel::IntakeAirTemp) - coolant
            }
            DerivedIndex::HourOfDay => self.hour_of_day(sample.timestamp_ms) as f64,
            DerivedIndex::IsPeakHour => {
                let hour = self.hour_of_day(sample.timestamp_ms);
                if (7..=9).contains(&hour) || (16..=18).contains(&hour) {
                    1.0
                } else {
                    0.0
                }
            }
            DerivedIndex::IsWeekend => match self.weekday(sample.timestamp_ms) {
                Some(Weekday::Sat) | Some(Weekday::Sun) => 1.0,
                _ => 0.0,
            },
        }
    }

    fn hour_of_day(&self, timestamp_ms: i64) -> u32 {
        Utc.timestamp_millis_opt(timestamp_ms)
            .single()
            .map(|dt| dt.hour())
            .unwrap_or(0)
    }

    fn weekday(&self, timestamp_ms: i64) -> Option<Weekday> {
        Utc.timestamp_millis_opt(timestamp_ms)
            .single()
            .map(|dt| dt.weekday())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TelemetrySample {
        TelemetrySample {
            timestamp_ms: 0,
            rpm: Some(3000.0),
            speed: Some(60.0),
            coolant_temp: Some(85.0),
            throttle_position: Some(25.0),
            engine_load: Some(50.0),
            fuel_pressure: Some(45.0),
            manifold_pressure: Some(30.0),
            intake_air_temp: Some(25.0),
            vehicle_class: Some(VehicleClass::Sedan),
            ..Default::default()
        }
    }

    #[test]
    fn test_power_to_weight_uses_class_table() {
        let calc = DerivedIndexCalculator::new();
        let s = sample();
        // (3000 * 50 / 1000) / 1500
        let ratio = calc.evaluate(DerivedIndex::PowerToWeight, &s);
        assert!((ratio - 0.1).abs() < 1e-9);

        let untagged = TelemetrySample {
            vehicle_class: None,
            ..sample()
        };
        let fallback = calc.evaluate(DerivedIndex::PowerToWeight, &untagged);
        assert!((fallback - 150.0 / 1800.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuel_efficiency_at_ideal_speed() {
        let calc = DerivedIndexCalculator::new();
        // speed=60 gives a full speed score; load 50 and throttle 25
        // contribute 0.5 and 0.75
        let idx = calc.evaluate(DerivedIndex::FuelEfficiency, &sample());
        assert!((idx - (1.0 + 0.5 + 0.75) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_engine_stress_is_capped() {
        let calc = DerivedIndexCalculator::new();
        let hot = TelemetrySample {
            rpm: Some(9000.0),
            engine_load: Some(100.0),
            coolant_temp: Some(150.0),
            ..sample()
        };
        assert_eq!(calc.evaluate(DerivedIndex::EngineStress, &hot), 1.0);
    }

    #[test]
    fn test_cooling_health_peaks_at_85() {
        let calc = DerivedIndexCalculator::new();
        assert_eq!(calc.evaluate(DerivedIndex::CoolingHealth, &sample()), 1.0);

        let cold = TelemetrySample {
            coolant_temp: Some(35.0),
            ..sample()
        };
        assert_eq!(calc.evaluate(DerivedIndex::CoolingHealth, &cold), 0.0);
    }

    #[test]
    fn test_transmission_load_zero_when_stationary() {
        let calc = DerivedIndexCalculator::new();
        let parked = TelemetrySample {
            speed: Some(0.0),
            ..sample()
        };
        assert_eq!(calc.evaluate(DerivedIndex::TransmissionLoad, &parked), 0.0);
    }

    #[test]
    fn test_fuel_system_health_manifold_step() {
        let calc = DerivedIndexCalculator::new();
        // pressure at target, manifold above 20
        assert!((calc.evaluate(DerivedIndex::FuelSystemHealth, &sample()) - 1.0).abs() < 1e-9);

        let low_manifold = TelemetrySample {
            manifold_pressure: Some(10.0),
            ..sample()
        };
        assert!(
            (calc.evaluate(DerivedIndex::FuelSystemHealth, &low_manifold) - 0.75).abs() < 1e-9
        );
    }

    #[test]
    fn test_time_features() {
        let calc = DerivedIndexCalculator::new();
        // 2024-01-06 08:00:00 UTC is a Saturday in the morning peak
        let ts = 1_704_528_000_000;
        let s = TelemetrySample {
            timestamp_ms: ts,
            ..sample()
        };
        assert_eq!(calc.evaluate(DerivedIndex::HourOfDay, &s), 8.0);
        assert_eq!(calc.evaluate(DerivedIndex::IsPeakHour, &s), 1.0);
        assert_eq!(calc.evaluate(DerivedIndex::IsWeekend, &s), 1.0);
    }

    #[test]
    fn test_missing_inputs_stay_finite() {
        let calc = DerivedIndexCalculator::new();
        let empty = TelemetrySample::default();
        for index in DerivedIndex::ALL {
            assert!(calc.evaluate(index, &empty).is_finite());
        }
    }
}
