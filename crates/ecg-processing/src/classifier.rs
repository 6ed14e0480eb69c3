//! Opaque classifier invocation
//!
//! The trained model is a black box behind a narrow capability trait:
//! it takes a normalized window and returns one probability per class.
//! The loaded instance lives in a swap-on-write handle so concurrent
//! requests always see either the old or the new fully-loaded model,
//! never a half-initialized one.

use crate::normalizer::NormalizedSignal;
use arc_swap::ArcSwapOption;
use ecg_core::{ClassificationResult, EcgError, EcgResult};
use std::sync::Arc;

/// Capability interface of the trained classifier artifact
pub trait OpaqueClassifier: Send + Sync {
    /// Produce one probability per class, aligned with the configured
    /// vocabulary by position
    fn invoke(&self, signal: &NormalizedSignal) -> EcgResult<Vec<f32>>;
}

/// Factory that can (re)load the classifier artifact
pub type ModelLoader = Box<dyn Fn() -> Option<Box<dyn OpaqueClassifier>> + Send + Sync>;

/// Single-owner, swap-on-write handle to the loaded classifier
///
/// Readers take a cheap snapshot; `replace` atomically publishes a new
/// instance. An optional loader supports lazy reload after a failed
/// startup load.
pub struct ModelHandle {
    slot: ArcSwapOption<Box<dyn OpaqueClassifier>>,
    loader: Option<ModelLoader>,
}

impl ModelHandle {
    /// Handle with no model loaded and no way to load one
    pub fn empty() -> Self {
        ModelHandle {
            slot: ArcSwapOption::empty(),
            loader: None,
        }
    }

    /// Handle holding an already-loaded model
    pub fn with_model(model: Box<dyn OpaqueClassifier>) -> Self {
        ModelHandle {
            slot: ArcSwapOption::from_pointee(model),
            loader: None,
        }
    }

    /// Handle that loads through the given factory, attempting one load
    /// immediately
    pub fn with_loader(loader: ModelLoader) -> Self {
        let handle = ModelHandle {
            slot: ArcSwapOption::empty(),
            loader: Some(loader),
        };
        handle.reload();
        handle
    }

    /// Whether a model is currently loaded
    pub fn is_loaded(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Snapshot of the current model, if any
    pub fn current(&self) -> Option<Arc<Box<dyn OpaqueClassifier>>> {
        self.slot.load_full()
    }

    /// Atomically publish a new model instance
    pub fn replace(&self, model: Box<dyn OpaqueClassifier>) {
        self.slot.store(Some(Arc::new(model)));
    }

    /// Attempt a (re)load through the factory; true when a model is
    /// loaded afterwards
    pub fn reload(&self) -> bool {
        if let Some(loader) = &self.loader {
            if let Some(model) = loader() {
                self.slot.store(Some(Arc::new(model)));
            }
        }
        self.is_loaded()
    }
}

/// Maps classifier output vectors onto the configured vocabulary
pub struct ClassificationAdapter {
    handle: Arc<ModelHandle>,
    labels: Vec<String>,
}

impl ClassificationAdapter {
    /// Create an adapter over a model handle and its label vocabulary
    pub fn new(handle: Arc<ModelHandle>, labels: Vec<String>) -> Self {
        ClassificationAdapter { handle, labels }
    }

    /// Label vocabulary, in model output order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Classify a normalized window
    ///
    /// A missing model gets one lazy reload attempt before surfacing
    /// `ModelUnavailable`. A probability vector whose length does not
    /// match the vocabulary is an inference failure, not a silent
    /// misalignment.
    pub fn classify(&self, signal: &NormalizedSignal) -> EcgResult<ClassificationResult> {
        let model = match self.handle.current() {
            Some(model) => model,
            None => {
                self.handle.reload();
                self.handle.current().ok_or(EcgError::ModelUnavailable)?
            }
        };

        let probabilities = model.invoke(signal).map_err(|e| match e {
            EcgError::ModelUnavailable => EcgError::ModelUnavailable,
            other => EcgError::Inference {
                reason: other.to_string(),
            },
        })?;

        if probabilities.len() != self.labels.len() {
            return Err(EcgError::Inference {
                reason: format!(
                    "classifier returned {} probabilities for {} classes",
                    probabilities.len(),
                    self.labels.len()
                ),
            });
        }

        let predicted = argmax_first(&probabilities).ok_or_else(|| EcgError::Inference {
            reason: "classifier returned an empty probability vector".to_string(),
        })?;

        Ok(ClassificationResult {
            label: self.labels[predicted].clone(),
            probabilities,
        })
    }
}

/// Index of the first-occurring maximum
fn argmax_first(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, max)) if v <= max => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
