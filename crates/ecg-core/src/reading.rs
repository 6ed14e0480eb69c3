//! Persisted reading and classification output types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Heart-rate estimate in BPM; `None` means "undetermined"
pub type HeartRateEstimate = Option<f64>;

/// Label plus the probability vector it was drawn from
///
/// Probability ordering matches the configured class vocabulary exactly;
/// the vocabulary travels with the model artifact, never hardcoded here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Predicted class label
    pub label: String,
    /// One probability per class, vocabulary order
    pub probabilities: Vec<f32>,
}

/// One persisted analysis result
///
/// Created only after the full pipeline succeeds; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    /// Record identifier
    pub id: Uuid,
    /// Registry row id of the owning device
    pub device_id: i64,
    /// Resolved UTC timestamp for the window
    pub timestamp: DateTime<Utc>,
    /// Predicted class label
    pub prediction: String,
    /// Probability vector in vocabulary order
    pub probabilities: Vec<f32>,
    /// Heart-rate estimate, absent when undetermined
    pub heart_rate_bpm: HeartRateEstimate,
    /// Raw beat window as received
    pub raw_samples: Vec<f32>,
    /// Fixed-length normalized window fed to the classifier
    pub normalized_samples: Vec<f32>,
    /// Companion AF window, stored opaquely
    pub af_samples: Option<Vec<f32>>,
}

impl Reading {
    /// Create a reading with a fresh record id
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device_id: i64,
        timestamp: DateTime<Utc>,
        classification: ClassificationResult,
        heart_rate_bpm: HeartRateEstimate,
        raw_samples: Vec<f32>,
        normalized_samples: Vec<f32>,
        af_samples: Option<Vec<f32>>,
    ) -> Self {
        Reading {
            id: Uuid::new_v4(),
            device_id,
            timestamp,
            prediction: classification.label,
            probabilities: classification.probabilities,
            heart_rate_bpm,
            raw_samples,
            normalized_samples,
            af_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_creation() {
        let classification = ClassificationResult {
            label: "PVC".to_string(),
            probabilities: vec![0.1, 0.2, 0.7],
        };
        let reading = Reading::new(
            7,
            Utc::now(),
            classification,
            Some(72.5),
            vec![1.0; 4],
            vec![0.0; 8],
            None,
        );
        assert_eq!(reading.device_id, 7);
        assert_eq!(reading.prediction, "PVC");
        assert_eq!(reading.heart_rate_bpm, Some(72.5));
        assert_eq!(reading.normalized_samples.len(), 8);
    }

    #[test]
    fn test_reading_ids_unique() {
        let classification = ClassificationResult {
            label: "Normal_Beat".to_string(),
            probabilities: vec![1.0, 0.0, 0.0],
        };
        let a = Reading::new(1, Utc::now(), classification.clone(), None, vec![], vec![], None);
        let b = Reading::new(1, Utc::now(), classification, None, vec![], vec![], None);
        assert_ne!(a.id, b.id);
    }
}
