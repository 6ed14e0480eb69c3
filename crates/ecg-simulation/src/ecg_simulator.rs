//! ECG waveform simulator with PQRST morphology
//!
//! Each beat is a sum of Gaussian deflections (P, Q, R, S, T waves)
//! placed on an ADC-scale baseline, with optional Gaussian noise,
//! baseline wander, powerline interference, and beat-interval jitter.
//! Seeded generation is reproducible sample-for-sample.

use crate::signal_patterns::RhythmPattern;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Gaussian deflection relative to the R-wave center: (offset s, amplitude, width s)
const PQRST: [(f64, f64, f64); 5] = [
    (-0.18, 0.15, 0.040), // P: atrial depolarization
    (-0.03, -0.12, 0.012), // Q
    (0.00, 1.00, 0.018),  // R: the dominant spike
    (0.025, -0.20, 0.014), // S
    (0.20, 0.25, 0.060),  // T: repolarization hump
];

/// Additive disturbance configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Gaussian noise standard deviation in ADC counts (0.0 = clean)
    pub gaussian_std: f32,
    /// Baseline wander amplitude in ADC counts
    pub baseline_wander: f32,
    /// Powerline interference amplitude in ADC counts
    pub powerline_amplitude: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            gaussian_std: 8.0,
            baseline_wander: 20.0,
            powerline_amplitude: 5.0,
        }
    }
}

/// Configuration for ECG simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcgSimConfig {
    /// Sampling rate in Hz
    pub sampling_rate: f32,
    /// Rhythm to generate
    pub pattern: RhythmPattern,
    /// R-wave amplitude in ADC counts
    pub amplitude: f32,
    /// ADC baseline (midpoint of a 12-bit range)
    pub baseline: f32,
    /// Noise configuration
    pub noise: NoiseConfig,
    /// Powerline frequency in Hz, when interference is wanted
    pub powerline_freq: Option<f32>,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for EcgSimConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 360.0,
            pattern: RhythmPattern::NormalSinus { heart_rate_bpm: 72.0 },
            amplitude: 800.0,
            baseline: 2048.0,
            noise: NoiseConfig::default(),
            powerline_freq: Some(50.0),
            seed: None,
        }
    }
}

/// Stateful ECG generator; consecutive segments are phase-continuous
pub struct EcgSimulator {
    config: EcgSimConfig,
    rng: StdRng,
    /// Global time of the next sample to generate, in seconds
    time: f64,
    /// R-wave centers scheduled so far, newest last
    beat_times: Vec<f64>,
    /// Width multiplier per scheduled beat (premature beats are wide)
    beat_widths: Vec<f64>,
}

impl EcgSimulator {
    /// Create a simulator; seeded when the config carries a seed
    pub fn new(config: EcgSimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        EcgSimulator {
            config,
            rng,
            time: 0.0,
            beat_times: Vec::new(),
            beat_widths: Vec::new(),
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &EcgSimConfig {
        &self.config
    }

    /// Generate the next `samples` values, continuing from previous calls
    pub fn generate_segment(&mut self, samples: usize) -> Vec<f32> {
        match self.config.pattern {
            RhythmPattern::Flatline { level } => {
                self.time += samples as f64 / self.config.sampling_rate as f64;
                return vec![level; samples];
            }
            RhythmPattern::Saturated { rail } => {
                self.time += samples as f64 / self.config.sampling_rate as f64;
                return vec![rail; samples];
            }
            _ => {}
        }

        let dt = 1.0 / self.config.sampling_rate as f64;
        let segment_end = self.time + samples as f64 * dt;
        self.schedule_beats(segment_end);

        let noise = if self.config.noise.gaussian_std > 0.0 {
            Normal::new(0.0, f64::from(self.config.noise.gaussian_std)).ok()
        } else {
            None
        };

        let mut out = Vec::with_capacity(samples);
        for _ in 0..samples {
            let t = self.time;
            let mut value = f64::from(self.config.baseline) + self.morphology_at(t);

            if let Some(noise) = &noise {
                value += noise.sample(&mut self.rng);
            }
            if self.config.noise.baseline_wander > 0.0 {
                value += f64::from(self.config.noise.baseline_wander) * (TAU * 0.25 * t).sin();
            }
            if let Some(freq) = self.config.powerline_freq {
                value += f64::from(self.config.noise.powerline_amplitude)
                    * (TAU * f64::from(freq) * t).sin();
            }

            out.push(value as f32);
            self.time += dt;
        }

        self.drop_stale_beats();
        out
    }

    /// Extend the beat schedule to cover the given end time
    fn schedule_beats(&mut self, until: f64) {
        let base_bpm = self
            .config
            .pattern
            .heart_rate_bpm()
            .unwrap_or(72.0) as f64;
        let base_interval = 60.0 / base_bpm;

        loop {
            // Start mid-cycle: a capture window almost never opens on an
            // R-wave, and a beat centered on sample 0 is not detectable
            let last = self
                .beat_times
                .last()
                .copied()
                .unwrap_or(-base_interval / 2.0);
            if last > until + 1.0 {
                break;
            }

            let (interval, width) = match self.config.pattern {
                RhythmPattern::SinusWithHrv { hrv_magnitude, .. } => {
                    let jitter = self.rng.gen_range(-1.0..1.0) * f64::from(hrv_magnitude);
                    (base_interval * (1.0 + jitter), 1.0)
                }
                RhythmPattern::PrematureBeats { probability, .. } => {
                    if self.rng.gen::<f32>() < probability {
                        // Early and wide, followed by a compensatory pause
                        (base_interval * 0.6, 2.2)
                    } else {
                        (base_interval, 1.0)
                    }
                }
                _ => (base_interval, 1.0),
            };

            self.beat_times.push(last + interval);
            self.beat_widths.push(width);
        }
    }

    /// PQRST contribution of all nearby beats at time `t`
    fn morphology_at(&self, t: f64) -> f64 {
        let amplitude = f64::from(self.config.amplitude);
        let mut value = 0.0;
        for (&beat, &width_scale) in self.beat_times.iter().zip(&self.beat_widths) {
            // A beat only influences roughly half a second around its center
            if (t - beat).abs() > 0.6 {
                continue;
            }
            for (offset, amp, width) in PQRST {
                let d = t - beat - offset;
                let w = width * width_scale;
                value += amplitude * amp * (-d * d / (2.0 * w * w)).exp();
            }
        }
        value
    }

    /// Forget beats that can no longer influence future samples
    fn drop_stale_beats(&mut self) {
        let horizon = self.time - 1.0;
        while let Some(&first) = self.beat_times.first() {
            if first < horizon {
                self.beat_times.remove(0);
                self.beat_widths.remove(0);
            } else {
                break;
            }
        }
    }
}
