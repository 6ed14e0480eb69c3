//! ECG-Simulation: synthetic beat-segment generation
//!
//! Seeded ECG waveform synthesis with PQRST morphology, degenerate
//! signal patterns for quality-gate exercises, and a real-time segment
//! stream for driving the ingestion pipeline without hardware.

pub mod ecg_simulator;
pub mod real_time_stream;
pub mod signal_patterns;

pub use ecg_simulator::{EcgSimConfig, EcgSimulator, NoiseConfig};
pub use real_time_stream::{SegmentStream, StreamCommand, StreamConfig};
pub use signal_patterns::RhythmPattern;
