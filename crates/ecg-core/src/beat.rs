//! BeatSegment: the unit of analysis received from a device
//!
//! One fixed-duration window of ECG amplitude samples, immutable once
//! received. The pipeline consumes it; nothing mutates it afterwards.

use crate::error::{EcgError, EcgResult};
use serde::{Deserialize, Serialize};

/// One analysis window of raw ECG samples as sent by a device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeatSegment {
    /// Registered device identifier string (e.g. "ECG_DEV_001")
    pub device_id: String,
    /// Raw amplitude values for beat analysis, arbitrary length
    pub samples: Vec<f32>,
    /// Caller-supplied ISO-8601 timestamp, if any
    pub timestamp: Option<String>,
    /// Companion AF-analysis window, stored opaquely when present
    pub af_samples: Option<Vec<f32>>,
}

impl BeatSegment {
    /// Create a segment, rejecting structurally unusable input
    pub fn new(device_id: impl Into<String>, samples: Vec<f32>) -> EcgResult<Self> {
        let device_id = device_id.into();
        if device_id.is_empty() {
            return Err(EcgError::validation("'device_id' is required"));
        }
        if samples.is_empty() {
            return Err(EcgError::validation("'samples' must not be empty"));
        }
        Ok(BeatSegment {
            device_id,
            samples,
            timestamp: None,
            af_samples: None,
        })
    }

    /// Attach a caller-supplied timestamp string
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Attach the companion AF-analysis window
    pub fn with_af_samples(mut self, af_samples: Vec<f32>) -> Self {
        self.af_samples = Some(af_samples);
        self
    }

    /// Number of raw samples in the window
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window carries any samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Window duration in seconds at the given sampling rate
    pub fn duration_secs(&self, sampling_rate_hz: f64) -> f64 {
        if sampling_rate_hz <= 0.0 {
            return 0.0;
        }
        self.samples.len() as f64 / sampling_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_creation() {
        let segment = BeatSegment::new("ECG_DEV_001", vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(segment.len(), 3);
        assert!(!segment.is_empty());
        assert!(segment.timestamp.is_none());
        assert!(segment.af_samples.is_none());
    }

    #[test]
    fn test_segment_rejects_missing_fields() {
        assert!(BeatSegment::new("", vec![1.0]).is_err());
        assert!(BeatSegment::new("ECG_DEV_001", vec![]).is_err());
    }

    #[test]
    fn test_segment_builders() {
        let segment = BeatSegment::new("ECG_DEV_001", vec![0.0; 16])
            .unwrap()
            .with_timestamp("2024-03-01T08:30:00+07:00")
            .with_af_samples(vec![0.5; 8]);
        assert_eq!(
            segment.timestamp.as_deref(),
            Some("2024-03-01T08:30:00+07:00")
        );
        assert_eq!(segment.af_samples.as_ref().unwrap().len(), 8);
    }

    #[test]
    fn test_duration() {
        let segment = BeatSegment::new("ECG_DEV_001", vec![0.0; 360]).unwrap();
        assert!((segment.duration_secs(360.0) - 1.0).abs() < 1e-9);
        assert_eq!(segment.duration_secs(0.0), 0.0);
    }
}
