//! ECG-Core: Foundation types for ECG telemetry ingestion
//!
//! Containers, error taxonomy, quality gating, and the seams towards the
//! device registry and reading store collaborators.

pub mod beat;
pub mod error;
pub mod quality;
pub mod reading;
pub mod store;
pub mod timestamp;

pub use beat::*;
pub use error::{EcgError, EcgResult};
pub use quality::{QualityGate, QualityThresholds};
pub use reading::*;
pub use store::{Device, DeviceRegistry, MemoryRegistry, MemoryStore, ReadingStore};
pub use timestamp::parse_client_timestamp;
