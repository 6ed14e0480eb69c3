//! Fixed-length z-score normalization
//!
//! Every window is forced to the classifier's input length (zero-padded
//! or truncated), then shifted to zero mean and unit variance. The mean
//! and standard deviation used are recorded on the output so a consumer
//! can map values back to the original scale.

use serde::{Deserialize, Serialize};

/// Standard deviations below this are treated as a constant signal
const STD_EPSILON: f64 = 1e-7;

/// A fixed-length, zero-mean/unit-variance window
///
/// Immutable after construction. Shape-wise this is the 1 x len x 1
/// tensor the classifier consumes, stored flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSignal {
    samples: Vec<f32>,
    mean: f32,
    std: f32,
}

impl NormalizedSignal {
    /// Normalized sample values
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Window length (always the configured target length)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples (target length zero)
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean removed during normalization
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Standard deviation divided out (1.0 for constant input)
    pub fn std(&self) -> f32 {
        self.std
    }

    /// Map the window back to the original amplitude scale
    pub fn denormalize(&self) -> Vec<f32> {
        self.samples
            .iter()
            .map(|&v| v * self.std + self.mean)
            .collect()
    }

    /// Consume the window, yielding the sample vector
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

/// Length-fixing z-score normalizer
#[derive(Debug, Clone, Copy)]
pub struct SignalNormalizer {
    target_length: usize,
}

impl SignalNormalizer {
    /// Create a normalizer for the given classifier input length
    pub fn new(target_length: usize) -> Self {
        SignalNormalizer { target_length }
    }

    /// Configured output length
    pub fn target_length(&self) -> usize {
        self.target_length
    }

    /// Normalize a raw window to the target length
    ///
    /// Deterministic: identical input always yields bit-identical output.
    /// Empty input produces an all-zero window, never NaN or infinity.
    pub fn normalize(&self, raw: &[f32]) -> NormalizedSignal {
        let mut adjusted: Vec<f32> = raw.iter().take(self.target_length).copied().collect();
        adjusted.resize(self.target_length, 0.0);

        let n = adjusted.len();
        if n == 0 {
            return NormalizedSignal {
                samples: adjusted,
                mean: 0.0,
                std: 1.0,
            };
        }

        // Accumulate in f64; the division order is fixed so results stay
        // bit-identical across calls.
        let mean = adjusted.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
        let variance = adjusted
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64;
        let std = variance.sqrt();
        let std = if std < STD_EPSILON { 1.0 } else { std };

        for v in adjusted.iter_mut() {
            *v = ((*v as f64 - mean) / std) as f32;
        }

        NormalizedSignal {
            samples: adjusted,
            mean: mean as f32,
            std: std as f32,
        }
    }
}
