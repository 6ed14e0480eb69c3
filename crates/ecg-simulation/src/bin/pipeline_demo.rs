//! Pipeline demo - simulated devices through the full ingestion path
//!
//! Signal flow: ECG Simulator -> Quality Gate -> Normalizer -> Classifier
//! -> Peak Detection / Heart Rate -> In-memory Store

use std::sync::Arc;

use ecg_core::{DeviceRegistry, EcgResult, MemoryRegistry, MemoryStore, ReadingStore};
use ecg_processing::{
    IngestionPipeline, ModelHandle, NormalizedSignal, OpaqueClassifier, PipelineConfig,
};
use ecg_simulation::{EcgSimConfig, EcgSimulator, RhythmPattern, SegmentStream, StreamCommand,
    StreamConfig};
use tracing::info;

/// Stand-in classifier: scores beats by normalized peak amplitude spread
struct AmplitudeHeuristic;

impl OpaqueClassifier for AmplitudeHeuristic {
    fn invoke(&self, signal: &NormalizedSignal) -> EcgResult<Vec<f32>> {
        let max = signal.samples().iter().cloned().fold(f32::MIN, f32::max);
        let min = signal.samples().iter().cloned().fold(f32::MAX, f32::min);
        let spread = max - min;
        // Wide spread reads as a clean beat, narrow as indeterminate
        if spread > 4.0 {
            Ok(vec![0.85, 0.10, 0.05])
        } else if spread > 2.0 {
            Ok(vec![0.30, 0.45, 0.25])
        } else {
            Ok(vec![0.10, 0.55, 0.35])
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("ECG telemetry pipeline demo");
    println!("Flow: Simulator -> Ingestion Pipeline -> In-memory Store\n");

    let registry = Arc::new(MemoryRegistry::new());
    let store = Arc::new(MemoryStore::new());
    let handle = Arc::new(ModelHandle::with_model(Box::new(AmplitudeHeuristic)));

    let device = registry.register("AA:BB:CC:DD:EE:01")?;
    info!(device_id = %device.device_id, mac = %device.mac_address, "device registered");

    let pipeline = IngestionPipeline::new(
        PipelineConfig::default(),
        handle,
        registry.clone(),
        store.clone(),
    )?;

    // One segment per rhythm, directly from the simulator
    for (name, pattern) in RhythmPattern::presets() {
        let mut simulator = EcgSimulator::new(EcgSimConfig {
            pattern,
            seed: Some(42),
            ..EcgSimConfig::default()
        });
        let samples = simulator.generate_segment(1024);
        let segment = ecg_core::BeatSegment::new(&device.device_id, samples)?;

        print!("{name:24} -> ");
        match pipeline.ingest(segment) {
            Ok(outcome) => {
                let bpm = outcome
                    .heart_rate
                    .map(|v| format!("{v:.1} bpm"))
                    .unwrap_or_else(|| "hr n/a".to_string());
                println!("{} ({})", outcome.prediction, bpm);
            }
            Err(e) => println!("rejected: {e}"),
        }
    }

    // Then a few seconds of streamed segments, as a device would send them
    let stream_config = StreamConfig {
        device_id: device.device_id.clone(),
        segment_samples: 1024,
        sim_config: EcgSimConfig {
            seed: Some(7),
            ..EcgSimConfig::default()
        },
        ..StreamConfig::default()
    };
    let mut stream = SegmentStream::new(stream_config);
    let mut receiver = stream.subscribe();
    let control = stream.control_handle();

    let stream_task = tokio::spawn(async move {
        stream.run().await;
    });

    control.send(StreamCommand::Start).await?;
    for _ in 0..3 {
        if let Ok(segment) = receiver.recv().await {
            let outcome = pipeline.ingest(segment)?;
            println!(
                "streamed segment  -> {} (reading {})",
                outcome.prediction, outcome.reading_id
            );
        }
    }
    control.send(StreamCommand::Shutdown).await?;
    stream_task.await?;

    let stored = store.recent(device.id, 10);
    println!("\n{} readings stored for {}", stored.len(), device.device_id);

    Ok(())
}
