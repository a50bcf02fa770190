//! In-Memory Telemetry Store

use crate::TelemetrySample;
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from the telemetry store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Internal lock failure
    #[error("Store error: {0}")]
    Internal(String),
}

/// In-memory, retention-bounded store of telemetry samples
///
/// Samples are kept in insertion (chronological) order, oldest first.
pub struct TelemetryStore {
    /// Sample log (in-memory)
    log: Mutex<VecDeque<TelemetrySample>>,
    /// Max retained samples
    max_records: usize,
}

impl TelemetryStore {
    /// Create a new store with default retention (~55 hours at 0.5Hz)
    pub fn new() -> Self {
        Self::with_retention(100_000)
    }

    /// Create a store retaining at most `max_records` samples
    ///
    /// A retention of 0 is clamped to 1; the store always holds the most
    /// recent insert.
    pub fn with_retention(max_records: usize) -> Self {
        let max_records = max_records.max(1);
        info!("Creating in-memory telemetry store (retention={})", max_records);
        Self {
            log: Mutex::new(VecDeque::with_capacity(max_records.min(10_000))),
            max_records,
        }
    }

    /// Insert a sample, evicting the oldest when retention is exceeded
    pub fn insert(&self, sample: TelemetrySample) -> Result<(), StoreError> {
        let mut log = self
            .log
            .lock()
            .map_err(|e| StoreError::Internal(format!("Lock error: {}", e)))?;

        while log.len() >= self.max_records {
            log.pop_front();
        }
        log.push_back(sample);
        Ok(())
    }

    /// Get up to `limit` historical samples in chronological order
    ///
    /// Optional `start_ms`/`end_ms` bound the timestamp range (inclusive).
    /// When more than `limit` samples match, the most recent `limit` are
    /// returned, still chronologically ascending.
    pub fn query_historical(
        &self,
        limit: usize,
        start_ms: Option<i64>,
        end_ms: Option<i64>,
    ) -> Result<Vec<TelemetrySample>, StoreError> {
        let log = self
            .log
            .lock()
            .map_err(|e| StoreError::Internal(format!("Lock error: {}", e)))?;

        let matching: Vec<TelemetrySample> = log
            .iter()
            .filter(|s| start_ms.map_or(true, |t| s.timestamp_ms >= t))
            .filter(|s| end_ms.map_or(true, |t| s.timestamp_ms <= t))
            .cloned()
            .collect();

        let skip = matching.len().saturating_sub(limit);
        let batch: Vec<TelemetrySample> = matching.into_iter().skip(skip).collect();
        debug!("Historical query returned {} samples", batch.len());
        Ok(batch)
    }

    /// Get the last `window` samples, most recent first
    pub fn query_recent(&self, window: usize) -> Result<Vec<TelemetrySample>, StoreError> {
        let log = self
            .log
            .lock()
            .map_err(|e| StoreError::Internal(format!("Lock error: {}", e)))?;

        Ok(log.iter().rev().take(window).cloned().collect())
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.log.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all samples (for testing)
    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}
