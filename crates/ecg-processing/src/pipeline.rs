//! Ingestion pipeline orchestration
//!
//! One segment flows Received → QualityChecked → Normalized → Classified
//! → RateEstimated → Persisted, or exits early as Rejected/Failed. The
//! numeric stages are pure and never block; the registry lookup and the
//! final commit are the only collaborator calls. An undetermined heart
//! rate is a successful outcome; a failed classification or commit
//! aborts the whole ingestion and nothing partial persists.

use crate::classifier::{ClassificationAdapter, ModelHandle};
use crate::config::PipelineConfig;
use crate::heart_rate::HeartRateEstimator;
use crate::normalizer::SignalNormalizer;
use crate::peaks::PeakDetector;
use chrono::{DateTime, Utc};
use ecg_core::{
    parse_client_timestamp, BeatSegment, DeviceRegistry, EcgError, EcgResult, QualityGate, Reading,
    ReadingStore,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Successful ingestion response payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionOutcome {
    /// Always "success"; failures travel as errors, never in this struct
    pub status: String,
    /// Predicted class label
    pub prediction: String,
    /// Heart-rate estimate, null when undetermined
    pub heart_rate: Option<f64>,
    /// Probability vector in vocabulary order
    pub probabilities: Vec<f32>,
    /// Identifier of the persisted reading
    pub reading_id: Uuid,
    /// Resolved UTC timestamp stored with the reading
    pub timestamp: DateTime<Utc>,
}

/// Orchestrates one ingestion per call; stateless across requests
///
/// The classifier handle and the collaborators are shared read-mostly
/// state; everything else is per-request.
pub struct IngestionPipeline {
    config: PipelineConfig,
    gate: QualityGate,
    normalizer: SignalNormalizer,
    detector: PeakDetector,
    estimator: HeartRateEstimator,
    adapter: ClassificationAdapter,
    registry: Arc<dyn DeviceRegistry>,
    store: Arc<dyn ReadingStore>,
}

impl IngestionPipeline {
    /// Build a pipeline from a validated configuration and its collaborators
    pub fn new(
        config: PipelineConfig,
        handle: Arc<ModelHandle>,
        registry: Arc<dyn DeviceRegistry>,
        store: Arc<dyn ReadingStore>,
    ) -> EcgResult<Self> {
        config.validate()?;
        Ok(IngestionPipeline {
            gate: QualityGate::new(config.quality),
            normalizer: SignalNormalizer::new(config.target_length),
            detector: PeakDetector::new(config.peaks),
            estimator: HeartRateEstimator::new(config.sampling_rate_hz, config.heart_rate),
            adapter: ClassificationAdapter::new(handle, config.class_labels.clone()),
            registry,
            store,
            config,
        })
    }

    /// Configuration the pipeline was built from
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one segment through the full pipeline
    ///
    /// Always runs to completion before the persist decision; partial
    /// results are never visible to other requests.
    pub fn ingest(&self, segment: BeatSegment) -> EcgResult<IngestionOutcome> {
        // Received: structural validation and device lookup
        if segment.device_id.is_empty() {
            return Err(EcgError::validation("'device_id' is required"));
        }
        if segment.samples.is_empty() {
            return Err(EcgError::validation("'samples' must not be empty"));
        }
        let device = self
            .registry
            .lookup(&segment.device_id)
            .ok_or_else(|| EcgError::UnknownDevice {
                device_id: segment.device_id.clone(),
            })?;
        info!(
            device = %device.device_id,
            samples = segment.samples.len(),
            "segment received"
        );

        // QualityChecked: cheap rail-fraction gate, policy-controlled
        if self.config.quality_gate_enabled && !self.gate.is_acceptable(&segment.samples) {
            let flat_fraction = self.gate.flat_fraction(&segment.samples);
            warn!(
                device = %device.device_id,
                flat_fraction,
                "segment rejected by quality gate"
            );
            return Err(EcgError::QualityRejected { flat_fraction });
        }

        // Normalized: deterministic, cannot fail
        let normalized = self.normalizer.normalize(&segment.samples);

        // Classified: the only stage with infrastructure failure modes
        let inference_start = Instant::now();
        let classification = self.adapter.classify(&normalized).map_err(|e| {
            error!(device = %device.device_id, error = %e, "classification failed");
            e
        })?;
        info!(
            device = %device.device_id,
            prediction = %classification.label,
            duration_ms = inference_start.elapsed().as_millis() as u64,
            "inference complete"
        );

        // RateEstimated: undetermined is success, not failure
        let peaks = self.detector.detect_peaks(normalized.samples());
        let heart_rate = self.estimator.estimate_bpm(&peaks);

        // Timestamp resolution: soft fallback to server time
        let timestamp = match parse_client_timestamp(segment.timestamp.as_deref()) {
            Some(parsed) => parsed,
            None => {
                if segment.timestamp.is_some() {
                    warn!(
                        device = %device.device_id,
                        raw = segment.timestamp.as_deref().unwrap_or(""),
                        "unparseable timestamp, using server time"
                    );
                }
                Utc::now()
            }
        };

        // Persisted: single atomic commit; on failure nothing is kept
        let reading = Reading::new(
            device.id,
            timestamp,
            classification,
            heart_rate,
            segment.samples,
            normalized.into_samples(),
            segment.af_samples,
        );
        let reading_id = reading.id;
        let prediction = reading.prediction.clone();
        let probabilities = reading.probabilities.clone();
        self.store.persist(reading).map_err(|e| {
            error!(device = %device.device_id, error = %e, "persist failed, reading discarded");
            e
        })?;

        info!(device = %device.device_id, %reading_id, prediction = %prediction, "reading persisted");
        Ok(IngestionOutcome {
            status: "success".to_string(),
            prediction,
            heart_rate,
            probabilities,
            reading_id,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::OpaqueClassifier;
    use crate::normalizer::NormalizedSignal;
    use ecg_core::{MemoryRegistry, MemoryStore};
    use std::f64::consts::TAU;

    struct FixedClassifier {
        probabilities: Vec<f32>,
    }

    impl OpaqueClassifier for FixedClassifier {
        fn invoke(&self, _signal: &NormalizedSignal) -> EcgResult<Vec<f32>> {
            Ok(self.probabilities.clone())
        }
    }

    struct Harness {
        pipeline: IngestionPipeline,
        registry: Arc<MemoryRegistry>,
        store: Arc<MemoryStore>,
    }

    fn harness_with(config: PipelineConfig, handle: ModelHandle) -> Harness {
        let registry = Arc::new(MemoryRegistry::new());
        registry.register("AA:BB:CC:DD:EE:01").unwrap();
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestionPipeline::new(
            config,
            Arc::new(handle),
            registry.clone(),
            store.clone(),
        )
        .unwrap();
        Harness {
            pipeline,
            registry,
            store,
        }
    }

    fn harness() -> Harness {
        harness_with(
            PipelineConfig::default(),
            ModelHandle::with_model(Box::new(FixedClassifier {
                probabilities: vec![0.85, 0.1, 0.05],
            })),
        )
    }

    /// ADC-scale sinusoid at the given beat rate
    fn sine_segment(cycles_per_minute: f64, sampling_rate: f64, samples: usize) -> Vec<f32> {
        (0..samples)
            .map(|i| {
                let t = i as f64 / sampling_rate;
                (2000.0 + 800.0 * (TAU * cycles_per_minute / 60.0 * t).sin()) as f32
            })
            .collect()
    }

    #[test]
    fn test_end_to_end_heart_rate() {
        let h = harness();
        let segment = BeatSegment::new("ECG_DEV_001", sine_segment(72.0, 360.0, 1024)).unwrap();
        let outcome = h.pipeline.ingest(segment).unwrap();

        assert_eq!(outcome.status, "success");
        assert_eq!(outcome.prediction, "Normal_Beat");
        let bpm = outcome.heart_rate.unwrap();
        assert!((bpm - 72.0).abs() <= 2.0, "estimated {} BPM", bpm);
        assert_eq!(h.store.len(), 1);
    }

    #[test]
    fn test_unknown_device_rejected() {
        let h = harness();
        let segment = BeatSegment::new("ECG_DEV_999", sine_segment(72.0, 360.0, 1024)).unwrap();
        let err = h.pipeline.ingest(segment).unwrap_err();
        assert_eq!(err.http_status(), 404);
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_flatline_rejected_before_inference() {
        // Model handle is empty, so reaching inference would surface 503;
        // the gate must fire first
        let h = harness_with(PipelineConfig::default(), ModelHandle::empty());
        let segment = BeatSegment::new("ECG_DEV_001", vec![0.0; 1024]).unwrap();
        let err = h.pipeline.ingest(segment).unwrap_err();
        assert!(matches!(err, EcgError::QualityRejected { .. }));
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_quality_gate_can_be_disabled() {
        let config = PipelineConfig {
            quality_gate_enabled: false,
            ..PipelineConfig::default()
        };
        let h = harness_with(
            config,
            ModelHandle::with_model(Box::new(FixedClassifier {
                probabilities: vec![0.2, 0.5, 0.3],
            })),
        );
        let segment = BeatSegment::new("ECG_DEV_001", vec![0.0; 1024]).unwrap();
        let outcome = h.pipeline.ingest(segment).unwrap();
        // Flat signal classifies but has no peaks: heart rate undetermined
        assert_eq!(outcome.prediction, "Other");
        assert_eq!(outcome.heart_rate, None);
    }

    #[test]
    fn test_model_unavailable_is_503() {
        let h = harness_with(PipelineConfig::default(), ModelHandle::empty());
        let segment = BeatSegment::new("ECG_DEV_001", sine_segment(72.0, 360.0, 1024)).unwrap();
        let err = h.pipeline.ingest(segment).unwrap_err();
        assert_eq!(err, EcgError::ModelUnavailable);
        assert_eq!(err.http_status(), 503);
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_persist_failure_leaves_nothing_visible() {
        let h = harness();
        h.store.fail_next_persist();
        let segment = BeatSegment::new("ECG_DEV_001", sine_segment(72.0, 360.0, 1024)).unwrap();
        let err = h.pipeline.ingest(segment).unwrap_err();
        assert!(matches!(err, EcgError::Persistence { .. }));

        // Rollback verified: nothing visible to subsequent reads
        let device = h.registry.lookup("ECG_DEV_001").unwrap();
        assert!(h.store.recent(device.id, 10).is_empty());

        // The same segment succeeds once the store recovers
        let segment = BeatSegment::new("ECG_DEV_001", sine_segment(72.0, 360.0, 1024)).unwrap();
        h.pipeline.ingest(segment).unwrap();
        assert_eq!(h.store.recent(device.id, 10).len(), 1);
    }

    #[test]
    fn test_client_timestamp_used_when_valid() {
        let h = harness();
        let segment = BeatSegment::new("ECG_DEV_001", sine_segment(72.0, 360.0, 1024))
            .unwrap()
            .with_timestamp("2024-03-01T08:30:00+07:00");
        let outcome = h.pipeline.ingest(segment).unwrap();
        assert_eq!(outcome.timestamp.to_rfc3339(), "2024-03-01T01:30:00+00:00");
    }

    #[test]
    fn test_bad_timestamp_falls_back_to_server_time() {
        let h = harness();
        let before = Utc::now();
        let segment = BeatSegment::new("ECG_DEV_001", sine_segment(72.0, 360.0, 1024))
            .unwrap()
            .with_timestamp("not-a-timestamp");
        let outcome = h.pipeline.ingest(segment).unwrap();
        assert!(outcome.timestamp >= before);
    }

    #[test]
    fn test_reading_payloads_stored() {
        let h = harness();
        let raw = sine_segment(72.0, 360.0, 500);
        let segment = BeatSegment::new("ECG_DEV_001", raw.clone())
            .unwrap()
            .with_af_samples(vec![1.0; 64]);
        h.pipeline.ingest(segment).unwrap();

        let device = h.registry.lookup("ECG_DEV_001").unwrap();
        let readings = h.store.recent(device.id, 1);
        assert_eq!(readings[0].raw_samples, raw);
        assert_eq!(readings[0].normalized_samples.len(), 1024);
        assert_eq!(readings[0].af_samples.as_ref().unwrap().len(), 64);
    }

    #[test]
    fn test_outcome_serializes_with_camel_case_heart_rate() {
        let h = harness();
        let segment = BeatSegment::new("ECG_DEV_001", sine_segment(72.0, 360.0, 1024)).unwrap();
        let outcome = h.pipeline.ingest(segment).unwrap();
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"heartRate\""));
        assert!(json.contains("\"status\":\"success\""));
    }
}
