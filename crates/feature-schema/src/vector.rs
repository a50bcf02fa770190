//! Feature Vector Type

use crate::FeatureSchema;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One engineered feature record derived from one telemetry sample
///
/// Immutable once produced. Values are stored positionally in the schema's
/// declared order; every vector built against the same schema has the same
/// key set and key order.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    schema: Arc<FeatureSchema>,
    timestamp_ms: i64,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build a vector from values in schema order
    ///
    /// Panics if `values` does not match the schema length; producers
    /// always emit one value per declared feature.
    pub fn new(schema: Arc<FeatureSchema>, timestamp_ms: i64, values: Vec<f64>) -> Self {
        assert_eq!(
            values.len(),
            schema.len(),
            "feature vector length must match schema"
        );
        Self {
            schema,
            timestamp_ms,
            values,
        }
    }

    /// Schema this vector was produced against
    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    /// Timestamp of the originating sample
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Value by feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|i| self.values[i])
    }

    /// Value by schema position
    pub fn value_at(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// All values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.schema.names().zip(self.values.iter().copied())
    }

    /// Build a new vector by mapping each `(position, value)` pair
    ///
    /// Used by transform stages so each stage produces a fresh vector
    /// instead of mutating a shared one.
    pub fn map_values<F>(&self, mut f: F) -> Self
    where
        F: FnMut(usize, f64) -> f64,
    {
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| f(i, v))
            .collect();
        Self {
            schema: Arc::clone(&self.schema),
            timestamp_ms: self.timestamp_ms,
            values,
        }
    }
}

struct OrderedFeatures<'a>(&'a FeatureVector);

impl Serialize for OrderedFeatures<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.values.len()))?;
        for (name, value) in self.0.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FeatureVector", 2)?;
        state.serialize_field("timestamp_ms", &self.timestamp_ms)?;
        state.serialize_field("features", &OrderedFeatures(self))?;
        state.end()
    }
}
