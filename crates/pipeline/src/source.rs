//! Data Store Collaborator Seam

use telemetry_log::{StoreError, TelemetryStore, TelemetrySample};

/// Read access to the telemetry store collaborator
///
/// Reads are blocking external calls; the pipeline never retains the
/// returned samples past one invocation.
pub trait SampleSource {
    /// Up to `limit` historical samples, chronologically ascending,
    /// optionally bounded to a timestamp range
    fn query_historical(
        &self,
        limit: usize,
        start_ms: Option<i64>,
        end_ms: Option<i64>,
    ) -> Result<Vec<TelemetrySample>, StoreError>;

    /// The last `window` samples, most recent first
    fn query_recent(&self, window: usize) -> Result<Vec<TelemetrySample>, StoreError>;
}

impl SampleSource for TelemetryStore {
    fn query_historical(
        &self,
        limit: usize,
        start_ms: Option<i64>,
        end_ms: Option<i64>,
    ) -> Result<Vec<TelemetrySample>, StoreError> {
        TelemetryStore::query_historical(self, limit, start_ms, end_ms)
    }

    fn query_recent(&self, window: usize) -> Result<Vec<TelemetrySample>, StoreError> {
        TelemetryStore::query_recent(self, window)
    }
}
