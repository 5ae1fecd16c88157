//! Dual-model uplift scoring

use crate::config::AppConfig;
use crate::error::ScoringError;
use crate::features::FeatureEncoder;
use crate::models::loader::ModelLoader;
use crate::models::ProbabilityModel;
use crate::schema::FeatureSchema;
use crate::types::analysis::{AnalysisResult, Persona, PersonaThresholds, UpliftScore};
use crate::types::profile::CustomerProfile;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Scores customer profiles by running both model arms on the same
/// aligned feature vector and differencing their conversion probabilities.
///
/// Constructed once at startup and shared behind an `Arc`; models load
/// exactly once per process. Each `analyze` call is independent and
/// produces either a complete result or a single error, never partial
/// numbers.
pub struct UpliftScorer {
    /// Treatment-arm model (conversion probability with the offer)
    treatment: RwLock<Box<dyn ProbabilityModel>>,
    /// Control-arm model (conversion probability without the offer)
    control: RwLock<Box<dyn ProbabilityModel>>,
    /// Shared training schema both arms were verified against at load
    schema: FeatureSchema,
    encoder: FeatureEncoder,
    thresholds: PersonaThresholds,
}

impl UpliftScorer {
    /// Load both model arms and build a scorer from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScoringError> {
        let loader = ModelLoader::with_threads(config.models.onnx_threads)?;
        let pair = loader.load_pair(&config.models)?;
        let schema = pair.schema().clone();
        let encoder = FeatureEncoder::new(&config.encoding);

        Ok(Self::new(
            Box::new(pair.treatment),
            Box::new(pair.control),
            schema,
            encoder,
            config.personas.clone(),
        ))
    }

    /// Build a scorer from already-loaded models.
    ///
    /// The model seam is a trait so tests can inject stubs; production
    /// code goes through `from_config`.
    pub fn new(
        treatment: Box<dyn ProbabilityModel>,
        control: Box<dyn ProbabilityModel>,
        schema: FeatureSchema,
        encoder: FeatureEncoder,
        thresholds: PersonaThresholds,
    ) -> Self {
        let producible = encoder.feature_names();
        let unfilled = schema
            .names()
            .iter()
            .filter(|name| !producible.iter().any(|p| p == *name))
            .count();
        if unfilled > 0 {
            warn!(
                columns = unfilled,
                "Schema columns the encoder never produces; they will always score as 0"
            );
        }

        Self {
            treatment: RwLock::new(treatment),
            control: RwLock::new(control),
            schema,
            encoder,
            thresholds,
        }
    }

    /// Score a profile end to end: encode, align, run both arms,
    /// difference, classify.
    pub fn analyze(&self, profile: &CustomerProfile) -> Result<AnalysisResult, ScoringError> {
        let features = self.encoder.encode(profile)?;
        let aligned = features.align(&self.schema);

        let p_treat = Self::predict(&self.treatment, &aligned)?;
        let p_ctrl = Self::predict(&self.control, &aligned)?;

        let score = UpliftScore::new(p_treat, p_ctrl);
        let persona = Persona::from_score(&score, &self.thresholds);

        debug!(
            profile_id = %profile.profile_id,
            p_treat = p_treat,
            p_ctrl = p_ctrl,
            uplift = score.uplift,
            persona = persona.label(),
            "Profile scored"
        );

        Ok(AnalysisResult::new(profile.profile_id.clone(), score, persona))
    }

    fn predict(
        model: &RwLock<Box<dyn ProbabilityModel>>,
        features: &[f32],
    ) -> Result<f64, ScoringError> {
        let mut model = model
            .write()
            .map_err(|e| ScoringError::inference("model", format!("lock poisoned: {}", e)))?;

        let prob = model.predict_probability(features)?;
        if !(0.0..=1.0).contains(&prob) {
            return Err(ScoringError::inference(
                model.name(),
                format!("probability {} outside [0, 1]", prob),
            ));
        }
        Ok(prob)
    }

    /// The shared training schema
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Number of features the encoder produces per profile
    pub fn feature_count(&self) -> usize {
        self.encoder.feature_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncodingConfig;

    struct StubModel {
        name: String,
        schema: FeatureSchema,
        probability: f64,
    }

    impl ProbabilityModel for StubModel {
        fn name(&self) -> &str {
            &self.name
        }

        fn schema(&self) -> &FeatureSchema {
            &self.schema
        }

        fn predict_probability(&mut self, features: &[f32]) -> Result<f64, ScoringError> {
            assert_eq!(features.len(), self.schema.len());
            Ok(self.probability)
        }
    }

    fn scorer(p_treat: f64, p_ctrl: f64) -> UpliftScorer {
        let encoder = FeatureEncoder::new(&EncodingConfig::default());
        let schema = FeatureSchema::new(encoder.feature_names());

        UpliftScorer::new(
            Box::new(StubModel {
                name: "treatment".to_string(),
                schema: schema.clone(),
                probability: p_treat,
            }),
            Box::new(StubModel {
                name: "control".to_string(),
                schema: schema.clone(),
                probability: p_ctrl,
            }),
            schema,
            encoder,
            PersonaThresholds::default(),
        )
    }

    fn profile() -> CustomerProfile {
        CustomerProfile::new("cust_123".to_string(), 35, "Delhi", "Web")
    }

    #[test]
    fn test_analyze_persuadable() {
        let result = scorer(0.7, 0.5).analyze(&profile()).unwrap();
        assert!((result.uplift_score - 0.2).abs() < 1e-9);
        assert_eq!(result.persona, Persona::Persuadable);
    }

    #[test]
    fn test_analyze_sure_thing() {
        // Uplift 0.03 falls through; p_ctrl 0.62 > 0.6
        let result = scorer(0.65, 0.62).analyze(&profile()).unwrap();
        assert_eq!(result.persona, Persona::SureThing);
    }

    #[test]
    fn test_analyze_do_not_disturb() {
        let result = scorer(0.1, 0.25).analyze(&profile()).unwrap();
        assert_eq!(result.persona, Persona::DoNotDisturb);
    }

    #[test]
    fn test_analyze_lost_cause() {
        let result = scorer(0.2, 0.22).analyze(&profile()).unwrap();
        assert_eq!(result.persona, Persona::LostCause);
    }

    #[test]
    fn test_probabilities_and_uplift_in_range() {
        let result = scorer(0.9, 0.05).analyze(&profile()).unwrap();
        assert!((0.0..=1.0).contains(&result.p_treat));
        assert!((0.0..=1.0).contains(&result.p_ctrl));
        assert!((-1.0..=1.0).contains(&result.uplift_score));
    }

    #[test]
    fn test_out_of_range_probability_is_inference_error() {
        let err = scorer(1.5, 0.5).analyze(&profile()).unwrap_err();
        assert!(matches!(err, ScoringError::Inference { .. }));
    }

    #[test]
    fn test_unknown_state_is_alignment_error() {
        let mut bad = profile();
        bad.state = "Atlantis".to_string();
        let err = scorer(0.7, 0.5).analyze(&bad).unwrap_err();
        assert!(matches!(err, ScoringError::FeatureAlignment(_)));
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let scorer = scorer(0.55, 0.48);
        let profile = profile();
        let first = scorer.analyze(&profile).unwrap();
        let second = scorer.analyze(&profile).unwrap();
        assert_eq!(first.persona, second.persona);
        assert_eq!(first.uplift_score, second.uplift_score);
    }
}
