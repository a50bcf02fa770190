//! Feature Schema Registry
//!
//! Provides the fixed, ordered registry of feature identifiers and their
//! compute kinds, plus the immutable feature vector produced per sample.
//! Feature names are resolved once at schema construction, never at
//! evaluation time.

mod schema;
mod vector;

pub use schema::{
    DerivedIndex, FeatureKind, FeatureSchema, FeatureSchemaBuilder, FeatureSpec, SchemaError,
};
pub use vector::FeatureVector;
