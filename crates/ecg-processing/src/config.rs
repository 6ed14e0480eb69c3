//! Pipeline configuration
//!
//! Every knob the environment supplies: window length, sampling rate,
//! label vocabulary, peak constraints, heart-rate bounds, and quality
//! thresholds. The vocabulary ships with the model artifact and must
//! match its output ordering exactly; it is configuration, not code.

use crate::heart_rate::HrBounds;
use crate::peaks::PeakParams;
use ecg_core::{EcgError, EcgResult, QualityThresholds};
use serde::{Deserialize, Serialize};

/// Full configuration for one ingestion pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Classifier input length in samples
    pub target_length: usize,
    /// Device sampling rate in Hz
    pub sampling_rate_hz: f64,
    /// Class vocabulary in model output order
    pub class_labels: Vec<String>,
    /// Peak detection constraints
    pub peaks: PeakParams,
    /// Heart-rate plausibility bounds
    pub heart_rate: HrBounds,
    /// Quality-gate thresholds
    pub quality: QualityThresholds,
    /// Whether the quality gate runs at all
    pub quality_gate_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_length: 1024,
            sampling_rate_hz: 360.0,
            class_labels: vec![
                "Normal_Beat".to_string(),
                "Other".to_string(),
                "PVC".to_string(),
            ],
            peaks: PeakParams::default(),
            heart_rate: HrBounds::default(),
            quality: QualityThresholds::default(),
            quality_gate_enabled: true,
        }
    }
}

impl PipelineConfig {
    /// Validate internal consistency before a pipeline is built from this
    pub fn validate(&self) -> EcgResult<()> {
        if self.target_length == 0 {
            return Err(EcgError::invalid_config("target_length must be positive"));
        }
        if self.sampling_rate_hz <= 0.0 || !self.sampling_rate_hz.is_finite() {
            return Err(EcgError::invalid_config(
                "sampling_rate_hz must be positive and finite",
            ));
        }
        if self.class_labels.is_empty() {
            return Err(EcgError::invalid_config("class_labels must not be empty"));
        }
        if self.heart_rate.min_bpm <= 0.0 || self.heart_rate.min_bpm >= self.heart_rate.max_bpm {
            return Err(EcgError::invalid_config(
                "heart-rate bounds must satisfy 0 < min_bpm < max_bpm",
            ));
        }
        self.quality.validate()?;
        Ok(())
    }

    /// Serialize to JSON for export alongside the model artifact
    pub fn to_json(&self) -> EcgResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EcgError::invalid_config(format!("config serialization failed: {e}")))
    }

    /// Load a configuration exported next to the model artifact
    pub fn from_json(json: &str) -> EcgResult<Self> {
        let config: PipelineConfig = serde_json::from_str(json)
            .map_err(|e| EcgError::invalid_config(format!("config parse failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
