//! Heart-rate estimation from detected peaks
//!
//! BPM comes from the mean spacing of successive R-peaks. Estimates the
//! data cannot support (too few peaks, degenerate spacing) and estimates
//! outside the physiological bounds both resolve to "undetermined" rather
//! than surfacing an implausible number.

use ecg_core::HeartRateEstimate;
use serde::{Deserialize, Serialize};

/// Mean RR intervals below this many samples are degenerate
const RR_EPSILON: f64 = 1e-9;

/// Physiological plausibility bounds in BPM
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrBounds {
    /// Estimates below this are discarded
    pub min_bpm: f64,
    /// Estimates above this are discarded
    pub max_bpm: f64,
}

impl Default for HrBounds {
    fn default() -> Self {
        Self {
            min_bpm: 40.0,
            max_bpm: 200.0,
        }
    }
}

/// Pure peak-spacing to BPM converter
///
/// No hidden state; safe to call concurrently with disjoint inputs.
#[derive(Debug, Clone, Copy)]
pub struct HeartRateEstimator {
    sampling_rate_hz: f64,
    bounds: HrBounds,
}

impl HeartRateEstimator {
    /// Create an estimator for the given sampling rate and bounds
    pub fn new(sampling_rate_hz: f64, bounds: HrBounds) -> Self {
        HeartRateEstimator {
            sampling_rate_hz,
            bounds,
        }
    }

    /// Bounds currently in effect
    pub fn bounds(&self) -> &HrBounds {
        &self.bounds
    }

    /// Estimate BPM from ascending peak indices
    ///
    /// `None` means undetermined: fewer than two peaks, non-ascending
    /// input, degenerate spacing, or a bounds violation.
    pub fn estimate_bpm(&self, peaks: &[usize]) -> HeartRateEstimate {
        if peaks.len() < 2 {
            return None;
        }

        let interval_count = (peaks.len() - 1) as f64;
        let mut total = 0.0;
        for pair in peaks.windows(2) {
            // Out-of-order indices carry no usable RR information
            match pair[1].checked_sub(pair[0]) {
                Some(rr) => total += rr as f64,
                None => return None,
            }
        }
        let mean_rr = total / interval_count;
        if mean_rr < RR_EPSILON {
            return None;
        }

        let bpm = self.sampling_rate_hz * 60.0 / mean_rr;
        if bpm < self.bounds.min_bpm || bpm > self.bounds.max_bpm {
            return None;
        }

        Some((bpm * 100.0).round() / 100.0)
    }
}
