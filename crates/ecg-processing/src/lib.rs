//! ECG-Processing: preprocessing and classification pipeline
//!
//! Fixed-length normalization, peak-based heart-rate estimation, opaque
//! classifier invocation, and the ingestion orchestration tying them to
//! the registry and store collaborators.

pub mod classifier;
pub mod config;
pub mod heart_rate;
pub mod normalizer;
pub mod peaks;
pub mod pipeline;

pub use classifier::{ClassificationAdapter, ModelHandle, OpaqueClassifier};
pub use config::PipelineConfig;
pub use heart_rate::{HeartRateEstimator, HrBounds};
pub use normalizer::{NormalizedSignal, SignalNormalizer};
pub use peaks::{PeakDetector, PeakParams};
pub use pipeline::{IngestionOutcome, IngestionPipeline};
