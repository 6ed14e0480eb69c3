//! Pre-defined cardiac rhythm patterns for simulation

use serde::{Deserialize, Serialize};

/// Rhythm behaviors the simulator can produce
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RhythmPattern {
    /// Steady sinus rhythm at a fixed rate
    NormalSinus { heart_rate_bpm: f32 },
    /// Sinus rhythm with beat-to-beat interval jitter
    SinusWithHrv {
        heart_rate_bpm: f32,
        /// Fraction of the RR interval each beat may vary by
        hrv_magnitude: f32,
    },
    /// Occasional premature wide beats riding a sinus base
    PrematureBeats {
        heart_rate_bpm: f32,
        /// Probability of a premature beat per cycle
        probability: f32,
    },
    /// Lead-off signal pinned to one value
    Flatline { level: f32 },
    /// Amplifier pinned at the high rail
    Saturated { rail: f32 },
}

impl RhythmPattern {
    /// Base heart rate for rhythms that have one
    pub fn heart_rate_bpm(&self) -> Option<f32> {
        match self {
            RhythmPattern::NormalSinus { heart_rate_bpm }
            | RhythmPattern::SinusWithHrv { heart_rate_bpm, .. }
            | RhythmPattern::PrematureBeats { heart_rate_bpm, .. } => Some(*heart_rate_bpm),
            RhythmPattern::Flatline { .. } | RhythmPattern::Saturated { .. } => None,
        }
    }

    /// Short pattern description
    pub fn description(&self) -> &'static str {
        match self {
            RhythmPattern::NormalSinus { .. } => "Normal sinus rhythm",
            RhythmPattern::SinusWithHrv { .. } => "Sinus rhythm with HRV",
            RhythmPattern::PrematureBeats { .. } => "Sinus with premature beats",
            RhythmPattern::Flatline { .. } => "Flatline (lead off)",
            RhythmPattern::Saturated { .. } => "Saturated (clipped)",
        }
    }

    /// Common preset patterns
    pub fn presets() -> Vec<(&'static str, RhythmPattern)> {
        vec![
            ("Resting", RhythmPattern::NormalSinus { heart_rate_bpm: 62.0 }),
            ("Active", RhythmPattern::NormalSinus { heart_rate_bpm: 95.0 }),
            (
                "Resting with HRV",
                RhythmPattern::SinusWithHrv {
                    heart_rate_bpm: 68.0,
                    hrv_magnitude: 0.05,
                },
            ),
            (
                "Frequent PVCs",
                RhythmPattern::PrematureBeats {
                    heart_rate_bpm: 74.0,
                    probability: 0.2,
                },
            ),
            ("Lead off", RhythmPattern::Flatline { level: 0.0 }),
            ("Clipped", RhythmPattern::Saturated { rail: 4095.0 }),
        ]
    }
}
