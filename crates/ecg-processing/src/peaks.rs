//! R-peak detection
//!
//! Local-maximum search with plateau handling, prominence filtering, and
//! minimum-spacing suppression. Spacing enforces the cardiac refractory
//! period: two true beats cannot land closer together than the heart can
//! physically contract, so the taller of two near-coincident candidates
//! wins and the other is noise.

use serde::{Deserialize, Serialize};

/// Constraints a candidate peak must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakParams {
    /// Minimum peak value; `None` means unbounded
    pub min_height: Option<f32>,
    /// Minimum vertical drop to the surrounding baseline; `None` means unbounded
    pub min_prominence: Option<f32>,
    /// Minimum spacing between accepted peaks, in samples
    pub min_distance: usize,
}

impl Default for PeakParams {
    fn default() -> Self {
        // 90 samples is 250 ms at 360 Hz, a refractory-period floor
        Self {
            min_height: None,
            min_prominence: Some(0.5),
            min_distance: 90,
        }
    }
}

/// Peak detector over a normalized window
#[derive(Debug, Clone, Copy, Default)]
pub struct PeakDetector {
    params: PeakParams,
}

impl PeakDetector {
    /// Create a detector with the given constraints
    pub fn new(params: PeakParams) -> Self {
        PeakDetector { params }
    }

    /// Constraints currently in effect
    pub fn params(&self) -> &PeakParams {
        &self.params
    }

    /// Detect peaks, returning strictly increasing sample indices
    ///
    /// Fewer than 3 samples cannot hold an interior maximum and yield an
    /// empty set.
    pub fn detect_peaks(&self, signal: &[f32]) -> Vec<usize> {
        let mut candidates = local_maxima(signal);

        if let Some(min_height) = self.params.min_height {
            candidates.retain(|&i| signal[i] >= min_height);
        }

        if let Some(min_prominence) = self.params.min_prominence {
            candidates.retain(|&i| prominence(signal, i) >= min_prominence);
        }

        let mut accepted = suppress_close_peaks(signal, candidates, self.params.min_distance);
        accepted.sort_unstable();
        accepted
    }
}

/// Strict local maxima; a flat maximum run contributes its first index
fn local_maxima(signal: &[f32]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if signal.len() < 3 {
        return maxima;
    }

    let mut i = 1;
    while i < signal.len() - 1 {
        if signal[i] > signal[i - 1] {
            // Walk to the end of a possible plateau
            let mut j = i;
            while j + 1 < signal.len() && signal[j + 1] == signal[i] {
                j += 1;
            }
            // A maximum needs a descent on the right of the run
            if j + 1 < signal.len() && signal[j + 1] < signal[i] {
                maxima.push(i);
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }
    maxima
}

/// Vertical drop from a peak to its surrounding baseline
///
/// Scan outward in each direction until a strictly higher sample or the
/// signal boundary, tracking the running minimum; the prominence is the
/// drop to the higher of the two minima.
fn prominence(signal: &[f32], peak: usize) -> f32 {
    let height = signal[peak];

    let mut left_min = height;
    for &v in signal[..peak].iter().rev() {
        if v > height {
            break;
        }
        if v < left_min {
            left_min = v;
        }
    }

    let mut right_min = height;
    for &v in &signal[peak + 1..] {
        if v > height {
            break;
        }
        if v < right_min {
            right_min = v;
        }
    }

    height - left_min.max(right_min)
}

/// Greedy tallest-first non-max suppression
///
/// Equal heights prefer the lower index. Peaks closer than `min_distance`
/// to an already accepted peak are dropped.
fn suppress_close_peaks(signal: &[f32], mut candidates: Vec<usize>, min_distance: usize) -> Vec<usize> {
    if min_distance == 0 || candidates.len() < 2 {
        return candidates;
    }

    candidates.sort_by(|&a, &b| {
        signal[b]
            .partial_cmp(&signal[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut accepted: Vec<usize> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let suppressed = accepted
            .iter()
            .any(|&kept| candidate.abs_diff(kept) < min_distance);
        if !suppressed {
            accepted.push(candidate);
        }
    }
    accepted
}
