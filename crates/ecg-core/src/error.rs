//! Error handling for the ECG ingestion core
//!
//! One taxonomy for the whole pipeline. The numeric components never
//! construct these for well-typed input; only the orchestration layer
//! raises them at its stage boundaries.

use thiserror::Error;

/// Result type alias for ECG core operations
pub type EcgResult<T> = Result<T, EcgError>;

/// Error taxonomy for ingestion and classification
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EcgError {
    /// Client-caused: missing fields, malformed payload, empty sample sequence
    #[error("invalid request: {reason}")]
    Validation {
        /// Human-readable rejection reason
        reason: String,
    },

    /// Client-caused: device identifier not present in the registry
    #[error("device '{device_id}' is not registered")]
    UnknownDevice {
        /// Identifier the caller supplied
        device_id: String,
    },

    /// Data-caused: signal is saturated or flatlined beyond the allowed fraction
    #[error("signal rejected by quality gate: {flat_fraction:.3} of samples at rail values")]
    QualityRejected {
        /// Fraction of samples at or beyond the rail thresholds
        flat_fraction: f64,
    },

    /// Infrastructure-caused: no classifier is currently loaded
    #[error("classification model is not available")]
    ModelUnavailable,

    /// Unexpected failure inside the opaque classifier invocation
    #[error("inference failed: {reason}")]
    Inference {
        /// Underlying failure description
        reason: String,
    },

    /// External store failure; the pipeline guarantees nothing partial persists
    #[error("persistence failed: {reason}")]
    Persistence {
        /// Underlying failure description
        reason: String,
    },

    /// Configuration rejected during validation
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What the validation found
        reason: String,
    },
}

impl EcgError {
    /// Build a validation error from any displayable reason
    pub fn validation(reason: impl Into<String>) -> Self {
        EcgError::Validation { reason: reason.into() }
    }

    /// Build a configuration error from any displayable reason
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        EcgError::InvalidConfig { reason: reason.into() }
    }

    /// HTTP-equivalent status class for the excluded web layer
    pub fn http_status(&self) -> u16 {
        match self {
            EcgError::Validation { .. } => 400,
            EcgError::UnknownDevice { .. } => 404,
            EcgError::QualityRejected { .. } => 400,
            EcgError::ModelUnavailable => 503,
            EcgError::Inference { .. } => 500,
            EcgError::Persistence { .. } => 500,
            EcgError::InvalidConfig { .. } => 500,
        }
    }

    /// Whether the caller may retry the request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, EcgError::ModelUnavailable)
    }
}
