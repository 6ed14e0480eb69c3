//! Real-time beat-segment streaming
//!
//! Emits fixed-length `BeatSegment`s at the cadence a wearable would,
//! for driving the ingestion pipeline without hardware. Subscribers get
//! segments over a broadcast channel; a control channel starts, stops,
//! and re-patterns the stream.

use crate::ecg_simulator::{EcgSimConfig, EcgSimulator};
use crate::signal_patterns::RhythmPattern;
use chrono::Utc;
use ecg_core::BeatSegment;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Duration};
use tracing::info;

/// Configuration for segment streaming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Simulator configuration
    pub sim_config: EcgSimConfig,
    /// Device identifier to stamp on emitted segments
    pub device_id: String,
    /// Samples per emitted segment
    pub segment_samples: usize,
    /// Broadcast buffer size in segments
    pub buffer_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sim_config: EcgSimConfig::default(),
            device_id: "ECG_DEV_001".to_string(),
            segment_samples: 1024,
            buffer_size: 16,
        }
    }
}

/// Commands for controlling a running stream
#[derive(Debug, Clone)]
pub enum StreamCommand {
    Start,
    Stop,
    SetPattern(RhythmPattern),
    Shutdown,
}

/// Real-time ECG segment stream
pub struct SegmentStream {
    config: StreamConfig,
    simulator: EcgSimulator,
    data_sender: broadcast::Sender<BeatSegment>,
    control_receiver: mpsc::Receiver<StreamCommand>,
    control_sender: mpsc::Sender<StreamCommand>,
    segments_emitted: u64,
}

impl SegmentStream {
    /// Create a stream; call `run` to start emitting
    pub fn new(config: StreamConfig) -> Self {
        let simulator = EcgSimulator::new(config.sim_config.clone());
        let (data_sender, _) = broadcast::channel(config.buffer_size.max(1));
        let (control_sender, control_receiver) = mpsc::channel(32);
        SegmentStream {
            config,
            simulator,
            data_sender,
            control_receiver,
            control_sender,
            segments_emitted: 0,
        }
    }

    /// Subscribe to emitted segments
    pub fn subscribe(&self) -> broadcast::Receiver<BeatSegment> {
        self.data_sender.subscribe()
    }

    /// Handle for sending control commands
    pub fn control_handle(&self) -> mpsc::Sender<StreamCommand> {
        self.control_sender.clone()
    }

    /// Segments emitted so far
    pub fn segments_emitted(&self) -> u64 {
        self.segments_emitted
    }

    /// Run until `Shutdown`; emits one segment per segment duration
    pub async fn run(&mut self) {
        let segment_secs =
            self.config.segment_samples as f64 / f64::from(self.config.sim_config.sampling_rate);
        let mut timer = interval(Duration::from_secs_f64(segment_secs.max(1e-3)));
        let mut running = false;

        info!(
            device = %self.config.device_id,
            segment_samples = self.config.segment_samples,
            segment_secs,
            "segment stream ready"
        );

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    if running {
                        let segment = self.next_segment();
                        // Losing a lagging subscriber is not an error
                        let _ = self.data_sender.send(segment);
                        self.segments_emitted += 1;
                    }
                }
                command = self.control_receiver.recv() => {
                    match command {
                        Some(StreamCommand::Start) => running = true,
                        Some(StreamCommand::Stop) => running = false,
                        Some(StreamCommand::SetPattern(pattern)) => {
                            let mut sim_config = self.config.sim_config.clone();
                            sim_config.pattern = pattern;
                            self.simulator = EcgSimulator::new(sim_config.clone());
                            self.config.sim_config = sim_config;
                        }
                        Some(StreamCommand::Shutdown) | None => break,
                    }
                }
            }
        }
    }

    /// Generate one timestamped segment
    fn next_segment(&mut self) -> BeatSegment {
        let samples = self.simulator.generate_segment(self.config.segment_samples);
        BeatSegment {
            device_id: self.config.device_id.clone(),
            samples,
            timestamp: Some(Utc::now().to_rfc3339()),
            af_samples: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stream_emits_after_start() {
        let config = StreamConfig {
            segment_samples: 64,
            sim_config: EcgSimConfig {
                seed: Some(7),
                ..EcgSimConfig::default()
            },
            ..StreamConfig::default()
        };
        let mut stream = SegmentStream::new(config);
        let mut receiver = stream.subscribe();
        let control = stream.control_handle();

        let task = tokio::spawn(async move {
            stream.run().await;
        });

        control.send(StreamCommand::Start).await.unwrap();
        let segment = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(segment.device_id, "ECG_DEV_001");
        assert_eq!(segment.samples.len(), 64);
        assert!(segment.timestamp.is_some());

        control.send(StreamCommand::Shutdown).await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_stream_idle_until_started() {
        let mut stream = SegmentStream::new(StreamConfig::default());
        let mut receiver = stream.subscribe();
        let control = stream.control_handle();

        let task = tokio::spawn(async move {
            stream.run().await;
        });

        // Never started: nothing should arrive
        let result =
            tokio::time::timeout(Duration::from_millis(200), receiver.recv()).await;
        assert!(result.is_err());

        control.send(StreamCommand::Shutdown).await.unwrap();
        task.await.unwrap();
    }
}
