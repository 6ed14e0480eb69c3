//! Signal quality gate
//!
//! Cheap early-exit check that rejects saturated or flatlined windows
//! before normalization and inference spend any work on them. A 12-bit
//! ADC pinned near either rail (disconnected lead, clipped amplifier)
//! produces long runs at the extremes; counting those is enough.

use crate::error::{EcgError, EcgResult};
use serde::{Deserialize, Serialize};

/// Rail thresholds and the tolerated fraction of rail samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Samples at or below this value count as low-rail (disconnection)
    pub low: f32,
    /// Samples at or above this value count as high-rail (saturation)
    pub high: f32,
    /// Maximum tolerated rail fraction; strictly above rejects
    pub max_flat_fraction: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        // 12-bit ADC, usable range 0-4095
        Self {
            low: 10.0,
            high: 4090.0,
            max_flat_fraction: 0.8,
        }
    }
}

impl QualityThresholds {
    /// Validate threshold consistency
    pub fn validate(&self) -> EcgResult<()> {
        if self.low >= self.high {
            return Err(EcgError::invalid_config(
                "quality low threshold must be below high threshold",
            ));
        }
        if !(0.0..=1.0).contains(&self.max_flat_fraction) {
            return Err(EcgError::invalid_config(
                "max_flat_fraction must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Saturation/flatline gate applied ahead of the pipeline
#[derive(Debug, Clone, Default)]
pub struct QualityGate {
    thresholds: QualityThresholds,
}

impl QualityGate {
    /// Create a gate with the given thresholds
    pub fn new(thresholds: QualityThresholds) -> Self {
        QualityGate { thresholds }
    }

    /// Thresholds currently in effect
    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// Fraction of samples sitting at either rail
    pub fn flat_fraction(&self, samples: &[f32]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let rail_count = samples
            .iter()
            .filter(|&&v| v <= self.thresholds.low || v >= self.thresholds.high)
            .count();
        rail_count as f64 / samples.len() as f64
    }

    /// Whether the window may proceed to normalization and inference
    pub fn is_acceptable(&self, samples: &[f32]) -> bool {
        self.flat_fraction(samples) <= self.thresholds.max_flat_fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> QualityGate {
        QualityGate::new(QualityThresholds::default())
    }

    #[test]
    fn test_boundary_fraction_accepted() {
        // 80 of 100 samples at the low rail is exactly 0.8, not above it
        let mut samples = vec![5.0f32; 80];
        samples.extend(vec![2000.0f32; 20]);
        assert_eq!(samples.len(), 100);
        assert!(gate().is_acceptable(&samples));
    }

    #[test]
    fn test_above_boundary_rejected() {
        let mut samples = vec![5.0f32; 81];
        samples.extend(vec![2000.0f32; 19]);
        assert_eq!(samples.len(), 100);
        assert!(!gate().is_acceptable(&samples));
    }

    #[test]
    fn test_high_rail_counts() {
        let samples = vec![4095.0f32; 50];
        assert!((gate().flat_fraction(&samples) - 1.0).abs() < 1e-12);
        assert!(!gate().is_acceptable(&samples));
    }

    #[test]
    fn test_clean_signal_passes() {
        let samples: Vec<f32> = (0..100).map(|i| 1800.0 + (i as f32 * 0.3).sin() * 400.0).collect();
        assert!(gate().is_acceptable(&samples));
        assert_eq!(gate().flat_fraction(&samples), 0.0);
    }

    #[test]
    fn test_empty_input_accepted() {
        assert!(gate().is_acceptable(&[]));
        assert_eq!(gate().flat_fraction(&[]), 0.0);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(QualityThresholds::default().validate().is_ok());

        let inverted = QualityThresholds {
            low: 4090.0,
            high: 10.0,
            max_flat_fraction: 0.8,
        };
        assert!(inverted.validate().is_err());

        let bad_fraction = QualityThresholds {
            max_flat_fraction: 1.5,
            ..QualityThresholds::default()
        };
        assert!(bad_fraction.validate().is_err());
    }
}
