//! Error types for the uplift scoring engine

use thiserror::Error;

/// Errors surfaced by model loading and scoring.
///
/// There is no partial-failure mode: an `analyze` call either returns a
/// complete result or exactly one of these kinds.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// A model artifact or its schema sidecar is missing, corrupt, or the
    /// treatment and control schemas disagree. Fatal at startup; the
    /// process cannot serve any request without both models.
    #[error("failed to load model `{name}`: {reason}")]
    ModelLoad { name: String, reason: String },

    /// A profile could not be converted into a valid feature vector.
    /// The request fails; the process keeps serving others.
    #[error("feature alignment failed: {0}")]
    FeatureAlignment(String),

    /// A model's prediction call failed. Inference is deterministic, so
    /// the error is surfaced without retry.
    #[error("inference failed for model `{name}`: {reason}")]
    Inference { name: String, reason: String },
}

impl ScoringError {
    pub fn model_load(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::ModelLoad {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn inference(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Inference {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScoringError::model_load("treatment", "file not found");
        assert_eq!(
            err.to_string(),
            "failed to load model `treatment`: file not found"
        );

        let err = ScoringError::FeatureAlignment("age 200 out of range".to_string());
        assert!(err.to_string().contains("feature alignment"));
    }
}
