//! Pipeline Orchestrator Implementation

use crate::{PipelineConfig, PipelineError, SampleSource};
use feature_engine::{WindowConfig, WindowEngine};
use feature_schema::{FeatureSchema, FeatureVector};
use normalization::{
    AnomalyDetector, AnomalyReport, FeatureNormalizer, NormalizationStats, QualityReport,
};
use serde::Serialize;
use std::sync::Arc;
use telemetry_log::{SyntheticGenerator, TelemetrySample};
use tracing::{debug, info, warn};

/// Lifecycle state of a pipeline instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Created, collaborator not yet probed
    Uninitialized,
    /// Collaborator probed; `degraded` when the probe returned no rows
    /// and training will be synthetic-augmented
    Initialized { degraded: bool },
    /// Training fit complete; frozen statistics exist
    Ready,
}

/// Training-mode output handed to the model-training collaborator
#[derive(Debug, Serialize)]
pub struct TrainingOutput {
    /// Engineered and normalized dataset, one vector per sample
    pub vectors: Vec<FeatureVector>,
    /// Feature names in schema order, identical to real-time mode
    pub feature_names: Vec<String>,
    /// Post-normalization quality findings
    pub quality: QualityReport,
    /// Real samples collected from the store
    pub real_count: usize,
    /// Samples added by synthetic augmentation
    pub synthetic_count: usize,
}

/// Sequences collection, feature engineering, normalization, and
/// validation for training and real-time modes
///
/// Both modes share one frozen schema and, after training, one set of
/// frozen normalization statistics; real-time mode never re-fits.
pub struct Pipeline<S: SampleSource> {
    source: S,
    config: PipelineConfig,
    engine: WindowEngine,
    normalizer: FeatureNormalizer,
    detector: AnomalyDetector,
    feature_names: Vec<String>,
    state: PipelineState,
}

impl<S: SampleSource> Pipeline<S> {
    /// Create a pipeline over the standard telemetry schema
    pub fn new(source: S, config: PipelineConfig) -> Self {
        Self::with_schema(source, Arc::new(FeatureSchema::standard()), config)
    }

    /// Create a pipeline over a caller-provided schema
    pub fn with_schema(source: S, schema: Arc<FeatureSchema>, config: PipelineConfig) -> Self {
        let window = WindowConfig {
            rolling_window: config.rolling_window,
            sample_interval_secs: config.sample_interval_secs,
        };
        let feature_names = schema.names().map(str::to_string).collect();
        Self {
            source,
            detector: AnomalyDetector::new(
                config.anomaly_threshold,
                config.anomaly_score_threshold,
            ),
            engine: WindowEngine::new(schema, window),
            normalizer: FeatureNormalizer::new(),
            feature_names,
            config,
            state: PipelineState::Uninitialized,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Feature names in schema order, shared by both modes
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Frozen normalizer (read-only view)
    pub fn normalizer(&self) -> &FeatureNormalizer {
        &self.normalizer
    }

    /// Resume a pipeline from persisted normalization statistics
    ///
    /// Restores Ready state without a training run; transforms consult the
    /// restored statistics verbatim.
    pub fn restore_stats(&mut self, stats: NormalizationStats) {
        self.normalizer = FeatureNormalizer::from_stats(stats);
        self.state = PipelineState::Ready;
    }

    /// Probe the collaborator and transition out of Uninitialized
    ///
    /// An empty probe is a warning, not a failure: the pipeline proceeds
    /// in degraded mode where training is synthetic-augmented. A failed
    /// read is fatal.
    pub fn initialize(&mut self) -> Result<(), PipelineError> {
        let probe = self.source.query_recent(1)?;
        let degraded = probe.is_empty();
        if degraded {
            warn!("Collaborator probe returned no rows; proceeding in synthetic-augmented mode");
        } else {
            info!("Pipeline initialized against live telemetry");
        }
        self.state = PipelineState::Initialized { degraded };
        Ok(())
    }

    /// Training mode: collect, augment, engineer, fit, transform, validate
    ///
    /// Fits and freezes the normalization statistics that every later
    /// real-time call will consult.
    pub fn run_training(&mut self, limit: usize) -> Result<TrainingOutput, PipelineError> {
        if self.state == PipelineState::Uninitialized {
            return Err(PipelineError::NotInitialized);
        }

        let mut samples = self.source.query_historical(limit, None, None)?;
        let real_count = samples.len();
        let synthetic_count = self.augment(&mut samples);
        info!(
            "Training on {} samples ({} real, {} synthetic)",
            samples.len(),
            real_count,
            synthetic_count
        );

        let engineered = self.engine.compute(&samples);
        self.normalizer.fit(&engineered, &self.feature_names);
        let vectors = self.normalizer.transform(&engineered, &self.feature_names)?;
        let quality = QualityReport::assess(&vectors);
        self.state = PipelineState::Ready;

        Ok(TrainingOutput {
            vectors,
            feature_names: self.feature_names.clone(),
            quality,
            real_count,
            synthetic_count,
        })
    }

    /// Real-time mode: engineer a recent window and normalize it with the
    /// frozen training statistics, returning the most recent vector
    ///
    /// Zero rows from the collaborator is fatal for the call; a missing
    /// fit is a configuration error.
    pub fn run_realtime(&self) -> Result<FeatureVector, PipelineError> {
        if self.state == PipelineState::Uninitialized {
            return Err(PipelineError::NotInitialized);
        }

        let mut recent = self.source.query_recent(self.config.realtime_window)?;
        if recent.is_empty() {
            return Err(PipelineError::NoData(
                "no recent telemetry for real-time features".to_string(),
            ));
        }
        // Store returns most-recent-first
        recent.reverse();

        let engineered = self.engine.compute(&recent);
        let mut vectors = self.normalizer.transform(&engineered, &self.feature_names)?;
        debug!("Real-time window engineered {} vectors", vectors.len());

        // compute() preserves 1:1 ordering, so the last vector is the
        // most recent sample
        vectors
            .pop()
            .ok_or_else(|| PipelineError::NoData("empty engineered window".to_string()))
    }

    /// Batch anomaly assessment with fresh per-batch statistics
    pub fn score_anomalies(&self, vectors: &[FeatureVector]) -> Vec<AnomalyReport> {
        self.detector.score(vectors, &self.feature_names)
    }

    /// Extend an undersized training batch with synthetic samples
    ///
    /// Below `min_training_samples`, the batch grows to
    /// `max(min_training_samples, 5 x real)` total. Returns the number of
    /// samples added.
    fn augment(&self, samples: &mut Vec<TelemetrySample>) -> usize {
        let real = samples.len();
        if real >= self.config.min_training_samples {
            return 0;
        }

        let target = (real * 5).max(self.config.min_training_samples);
        let needed = target - real;
        let interval_ms = (self.config.sample_interval_secs * 1000.0) as i64;
        let start_ms = samples
            .last()
            .map(|s| s.timestamp_ms + interval_ms)
            .unwrap_or(0);

        warn!(
            "Training batch of {} below minimum {}; augmenting with {} synthetic samples",
            real, self.config.min_training_samples, needed
        );
        let mut generator =
            SyntheticGenerator::new(self.config.synth_seed).with_interval_ms(interval_ms.max(1));
        samples.extend(generator.generate(needed, start_ms));
        needed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_log::{StoreError, TelemetryStore};

    fn store_with(count: usize) -> TelemetryStore {
        let store = TelemetryStore::new();
        for i in 0..count {
            store
                .insert(TelemetrySample {
                    timestamp_ms: i as i64 * 2000,
                    rpm: Some(800.0 + (i % 50) as f64 * 40.0),
                    speed: Some(20.0 + (i % 40) as f64),
                    coolant_temp: Some(85.0 + (i % 10) as f64),
                    throttle_position: Some(15.0 + (i % 30) as f64),
                    engine_load: Some(30.0 + (i % 25) as f64),
                    fuel_pressure: Some(45.0),
                    manifold_pressure: Some(25.0),
                    intake_air_temp: Some(30.0),
                    ..Default::default()
                })
                .unwrap();
        }
        store
    }

    fn ready_pipeline(count: usize) -> Pipeline<TelemetryStore> {
        let mut pipeline = Pipeline::new(store_with(count), PipelineConfig::default());
        pipeline.initialize().unwrap();
        pipeline
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut pipeline = ready_pipeline(1200);
        assert_eq!(
            pipeline.state(),
            PipelineState::Initialized { degraded: false }
        );
        pipeline.run_training(2000).unwrap();
        assert_eq!(pipeline.state(), PipelineState::Ready);
    }

    #[test]
    fn test_empty_probe_is_degraded_not_fatal() {
        let mut pipeline = Pipeline::new(TelemetryStore::new(), PipelineConfig::default());
        pipeline.initialize().unwrap();
        assert_eq!(
            pipeline.state(),
            PipelineState::Initialized { degraded: true }
        );

        // Degraded training is fully synthetic
        let output = pipeline.run_training(2000).unwrap();
        assert_eq!(output.real_count, 0);
        assert_eq!(output.synthetic_count, 1000);
    }

    #[test]
    fn test_training_before_initialize_fails() {
        let mut pipeline = Pipeline::new(store_with(100), PipelineConfig::default());
        assert!(matches!(
            pipeline.run_training(1000),
            Err(PipelineError::NotInitialized)
        ));
    }

    #[test]
    fn test_small_batch_triggers_augmentation() {
        let mut pipeline = ready_pipeline(500);
        let output = pipeline.run_training(2000).unwrap();
        assert_eq!(output.real_count, 500);
        assert_eq!(output.synthetic_count, 2000);
        assert!(output.vectors.len() >= 2500);
    }

    #[test]
    fn test_large_batch_is_not_augmented() {
        let mut pipeline = ready_pipeline(1500);
        let output = pipeline.run_training(2000).unwrap();
        assert_eq!(output.real_count, 1500);
        assert_eq!(output.synthetic_count, 0);
    }

    #[test]
    fn test_realtime_before_fit_is_configuration_error() {
        let mut pipeline = ready_pipeline(200);
        // Initialized but never trained
        assert!(matches!(
            pipeline.run_realtime(),
            Err(PipelineError::NotFitted(_))
        ));
        // Training fixes it
        pipeline.run_training(2000).unwrap();
        assert!(pipeline.run_realtime().is_ok());
    }

    #[test]
    fn test_realtime_with_empty_store_is_fatal() {
        let mut pipeline = Pipeline::new(TelemetryStore::new(), PipelineConfig::default());
        pipeline.initialize().unwrap();
        pipeline.run_training(2000).unwrap();
        assert!(matches!(
            pipeline.run_realtime(),
            Err(PipelineError::NoData(_))
        ));
    }

    #[test]
    fn test_modes_share_schema_and_frozen_stats() {
        let mut pipeline = ready_pipeline(1200);
        let training = pipeline.run_training(2000).unwrap();
        let stats_after_training = pipeline.normalizer().stats().unwrap().clone();

        let vector = pipeline.run_realtime().unwrap();
        let realtime_names: Vec<&str> = vector.iter().map(|(name, _)| name).collect();
        let training_names: Vec<&str> =
            training.feature_names.iter().map(String::as_str).collect();
        assert_eq!(realtime_names, training_names);

        // Real-time did not re-fit
        assert_eq!(pipeline.normalizer().stats().unwrap(), &stats_after_training);
    }

    #[test]
    fn test_realtime_returns_most_recent_sample() {
        let mut pipeline = ready_pipeline(1200);
        pipeline.run_training(2000).unwrap();

        let vector = pipeline.run_realtime().unwrap();
        // Fixture timestamps are i * 2000 for 1200 samples
        assert_eq!(vector.timestamp_ms(), 1199 * 2000);
    }

    #[test]
    fn test_restore_stats_skips_training() {
        let mut trained = ready_pipeline(1200);
        trained.run_training(2000).unwrap();
        let stats = trained.normalizer().stats().unwrap().clone();

        let mut restored = Pipeline::new(store_with(1200), PipelineConfig::default());
        restored.initialize().unwrap();
        restored.restore_stats(stats);
        assert_eq!(restored.state(), PipelineState::Ready);

        let a = trained.run_realtime().unwrap();
        let b = restored.run_realtime().unwrap();
        assert_eq!(a.values(), b.values());
    }

    #[test]
    fn test_end_to_end_lag_and_rolling_mean() {
        // rpm [1000, 1000, 7000] over three samples
        let store = TelemetryStore::new();
        for (i, rpm) in [1000.0, 1000.0, 7000.0].iter().enumerate() {
            store
                .insert(TelemetrySample {
                    timestamp_ms: i as i64 * 2000,
                    rpm: Some(*rpm),
                    ..Default::default()
                })
                .unwrap();
        }

        let config = PipelineConfig {
            rolling_window: 3,
            ..Default::default()
        };
        let pipeline = Pipeline::new(store, config);
        let samples = pipeline.source.query_historical(10, None, None).unwrap();
        let engineered = pipeline.engine.compute(&samples);

        assert_eq!(engineered[2].get("rpm_lag_1").unwrap(), 1000.0);
        assert!((engineered[1].get("rpm_rolling_mean").unwrap() - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn test_anomaly_scoring_over_training_output() {
        let mut pipeline = ready_pipeline(1200);
        let output = pipeline.run_training(2000).unwrap();
        let reports = pipeline.score_anomalies(&output.vectors);
        assert_eq!(reports.len(), output.vectors.len());
        for report in &reports {
            assert!(report.overall_anomaly_score >= 0.0);
            assert!(report.overall_anomaly_score <= 1.0);
        }
    }

    struct FailingSource;

    impl SampleSource for FailingSource {
        fn query_historical(
            &self,
            _limit: usize,
            _start_ms: Option<i64>,
            _end_ms: Option<i64>,
        ) -> Result<Vec<TelemetrySample>, StoreError> {
            Err(StoreError::Internal("collaborator offline".to_string()))
        }

        fn query_recent(&self, _window: usize) -> Result<Vec<TelemetrySample>, StoreError> {
            Err(StoreError::Internal("collaborator offline".to_string()))
        }
    }

    #[test]
    fn test_failed_probe_is_fatal() {
        let mut pipeline = Pipeline::new(FailingSource, PipelineConfig::default());
        assert!(matches!(
            pipeline.initialize(),
            Err(PipelineError::Store(_))
        ));
        assert_eq!(pipeline.state(), PipelineState::Uninitialized);
    }
}
