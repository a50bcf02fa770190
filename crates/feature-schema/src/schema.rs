//! Feature Registry Implementation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use telemetry_log::SensorChannel;
use thiserror::Error;
use tracing::debug;

/// Errors during schema construction
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// Same feature name registered twice
    #[error("Duplicate feature name: {0}")]
    DuplicateFeature(String),

    /// Schema with no features
    #[error("Schema must declare at least one feature")]
    Empty,
}

/// Single-sample derived index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivedIndex {
    PowerToWeight,
    FuelEfficiency,
    EngineStress,
    CoolingHealth,
    FuelSystemHealth,
    EnginePower,
    TransmissionLoad,
    ThrottleResponse,
    AmbientTempDiff,
    HourOfDay,
    IsPeakHour,
    IsWeekend,
}

impl DerivedIndex {
    /// All indices in declaration order
    pub const ALL: [DerivedIndex; 12] = [
        DerivedIndex::PowerToWeight,
        DerivedIndex::FuelEfficiency,
        DerivedIndex::EngineStress,
        DerivedIndex::CoolingHealth,
        DerivedIndex::FuelSystemHealth,
        DerivedIndex::EnginePower,
        DerivedIndex::TransmissionLoad,
        DerivedIndex::ThrottleResponse,
        DerivedIndex::AmbientTempDiff,
        DerivedIndex::HourOfDay,
        DerivedIndex::IsPeakHour,
        DerivedIndex::IsWeekend,
    ];

    /// Feature identifier for this index
    pub fn name(&self) -> &'static str {
        match self {
            DerivedIndex::PowerToWeight => "power_to_weight_ratio",
            DerivedIndex::FuelEfficiency => "fuel_efficiency_index",
            DerivedIndex::EngineStress => "engine_stress_index",
            DerivedIndex::CoolingHealth => "cooling_system_health",
            DerivedIndex::FuelSystemHealth => "fuel_system_health",
            DerivedIndex::EnginePower => "engine_power_estimate",
            DerivedIndex::TransmissionLoad => "transmission_load",
            DerivedIndex::ThrottleResponse => "throttle_response",
            DerivedIndex::AmbientTempDiff => "ambient_temp_diff",
            DerivedIndex::HourOfDay => "hour_of_day",
            DerivedIndex::IsPeakHour => "is_peak_hour",
            DerivedIndex::IsWeekend => "is_weekend",
        }
    }
}

/// Compute kind of a declared feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Raw channel value, missing coerced to zero
    Raw(SensorChannel),
    /// Centered rolling mean over the configured window
    RollingMean(SensorChannel),
    /// Centered rolling sample std over the configured window
    RollingStd(SensorChannel),
    /// First difference over the fixed sample interval
    RateOfChange(SensorChannel),
    /// Channel value `k` samples in the past
    Lag(SensorChannel, usize),
    /// Trailing moving average over `m` samples
    MovingAverage(SensorChannel, usize),
    /// Single-sample derived index
    Derived(DerivedIndex),
}

/// One declared feature: identifier plus compute kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

/// Fixed, ordered feature registry
///
/// Order is frozen at construction and identical for every vector
/// produced against this schema.
#[derive(Debug)]
pub struct FeatureSchema {
    specs: Vec<FeatureSpec>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    fn from_specs(specs: Vec<FeatureSpec>) -> Result<Self, SchemaError> {
        if specs.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateFeature(spec.name.clone()));
            }
        }
        debug!("Built feature schema with {} features", specs.len());
        Ok(Self { specs, index })
    }

    /// Start building a schema
    pub fn builder() -> FeatureSchemaBuilder {
        FeatureSchemaBuilder::default()
    }

    /// Standard telemetry schema
    ///
    /// All channels raw; windowed stats for rpm, speed, coolant temp, and
    /// engine load; lags [1,2,3] and moving averages [5,10] for rpm and
    /// speed; all derived indices.
    pub fn standard() -> Self {
        let windowed = [
            SensorChannel::Rpm,
            SensorChannel::Speed,
            SensorChannel::CoolantTemp,
            SensorChannel::EngineLoad,
        ];
        let mut builder = Self::builder().raw_channels(&SensorChannel::ALL);
        for channel in windowed {
            builder = builder.windowed(channel);
        }
        for channel in [SensorChannel::Rpm, SensorChannel::Speed] {
            builder = builder.lags(channel, &[1, 2, 3]);
            builder = builder.moving_averages(channel, &[5, 10]);
        }
        for index in DerivedIndex::ALL {
            builder = builder.derived(index);
        }
        builder.build().expect("standard schema is collision-free")
    }

    /// Number of declared features
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Check if the schema is empty
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Feature specs in declared order
    pub fn specs(&self) -> &[FeatureSpec] {
        &self.specs
    }

    /// Feature names in declared order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.name.as_str())
    }

    /// Position of a feature name, if declared
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Check whether a feature name is declared
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

/// Builder for [`FeatureSchema`]
#[derive(Debug, Default)]
pub struct FeatureSchemaBuilder {
    specs: Vec<FeatureSpec>,
}

impl FeatureSchemaBuilder {
    fn push(mut self, name: String, kind: FeatureKind) -> Self {
        self.specs.push(FeatureSpec { name, kind });
        self
    }

    /// Add raw value features for the given channels
    pub fn raw_channels(mut self, channels: &[SensorChannel]) -> Self {
        for &channel in channels {
            self = self.push(channel.name().to_string(), FeatureKind::Raw(channel));
        }
        self
    }

    /// Add rolling mean, rolling std, and rate-of-change for a channel
    pub fn windowed(mut self, channel: SensorChannel) -> Self {
        let base = channel.name();
        self = self.push(
            format!("{base}_rolling_mean"),
            FeatureKind::RollingMean(channel),
        );
        self = self.push(
            format!("{base}_rolling_std"),
            FeatureKind::RollingStd(channel),
        );
        self.push(
            format!("{base}_rate_of_change"),
            FeatureKind::RateOfChange(channel),
        )
    }

    /// Add lag features for a channel, one per requested lag
    pub fn lags(mut self, channel: SensorChannel, lags: &[usize]) -> Self {
        for &k in lags {
            self = self.push(
                format!("{}_lag_{}", channel.name(), k),
                FeatureKind::Lag(channel, k),
            );
        }
        self
    }

    /// Add trailing moving-average features for a channel
    pub fn moving_averages(mut self, channel: SensorChannel, windows: &[usize]) -> Self {
        for &m in windows {
            self = self.push(
                format!("{}_ma_{}", channel.name(), m),
                FeatureKind::MovingAverage(channel, m),
            );
        }
        self
    }

    /// Add a derived index feature
    pub fn derived(self, index: DerivedIndex) -> Self {
        self.push(index.name().to_string(), FeatureKind::Derived(index))
    }

    /// Freeze the schema
    pub fn build(self) -> Result<FeatureSchema, SchemaError> {
        FeatureSchema::from_specs(self.specs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schema_has_unique_ordered_names() {
        let schema = FeatureSchema::standard();
        assert!(!schema.is_empty());

        let names: Vec<_> = schema.names().collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());

        // Order is positional
        for (i, name) in names.iter().enumerate() {
            assert_eq!(schema.position(name), Some(i));
        }
    }

    #[test]
    fn test_lag_names_are_deterministic() {
        let schema = FeatureSchema::builder()
            .lags(SensorChannel::Rpm, &[1, 5])
            .build()
            .unwrap();
        let names: Vec<_> = schema.names().collect();
        assert_eq!(names, vec!["rpm_lag_1", "rpm_lag_5"]);
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let result = FeatureSchema::builder()
            .raw_channels(&[SensorChannel::Rpm])
            .raw_channels(&[SensorChannel::Rpm])
            .build();
        assert!(matches!(result, Err(SchemaError::DuplicateFeature(_))));
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert!(matches!(
            FeatureSchema::builder().build(),
            Err(SchemaError::Empty)
        ));
    }
}
