//! ML model loading and scoring components

pub mod loader;
pub mod scoring;

use crate::error::ScoringError;
use crate::schema::FeatureSchema;

/// A binary probability estimator with a known training schema.
///
/// The trait is the injection seam for the scorer: production models are
/// ONNX sessions loaded from disk, tests inject stubs with fixed outputs.
pub trait ProbabilityModel: Send + Sync {
    /// Model name used in logs and errors
    fn name(&self) -> &str;

    /// Ordered feature names the model was trained with
    fn schema(&self) -> &FeatureSchema;

    /// Predict the positive-class probability for a schema-aligned
    /// feature vector. The result is in [0, 1].
    fn predict_probability(&mut self, features: &[f32]) -> Result<f64, ScoringError>;
}

pub use loader::{LoadedModel, ModelLoader, ModelPair};
pub use scoring::UpliftScorer;
