//! Analysis result data structures: uplift scores and persona segments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actionable persona segment derived from an uplift score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Persuadable,
    SureThing,
    DoNotDisturb,
    LostCause,
}

impl Persona {
    /// Classify a score into a persona.
    ///
    /// The rules are ordered, not mutually exclusive: the Persuadable check
    /// runs first, so a customer with both high uplift and high control
    /// probability is Persuadable, never Sure Thing. All comparisons are
    /// strict.
    pub fn from_score(score: &UpliftScore, thresholds: &PersonaThresholds) -> Self {
        if score.uplift > thresholds.persuadable_min_uplift {
            Persona::Persuadable
        } else if score.p_ctrl > thresholds.sure_thing_min_control {
            Persona::SureThing
        } else if score.uplift < thresholds.do_not_disturb_max_uplift {
            Persona::DoNotDisturb
        } else {
            Persona::LostCause
        }
    }

    /// Human-readable segment label
    pub fn label(&self) -> &'static str {
        match self {
            Persona::Persuadable => "Persuadable",
            Persona::SureThing => "Sure Thing",
            Persona::DoNotDisturb => "Do Not Disturb",
            Persona::LostCause => "Lost Cause",
        }
    }

    /// Targeting recommendation for the segment
    pub fn recommendation(&self) -> &'static str {
        match self {
            Persona::Persuadable => {
                "Highly likely to convert with a discount. Target with the offer."
            }
            Persona::SureThing => {
                "Likely to convert anyway. Do not waste a discount."
            }
            Persona::DoNotDisturb => {
                "May be annoyed by a discount. Do not target."
            }
            Persona::LostCause => {
                "Unlikely to convert, even with a discount. Do not target."
            }
        }
    }

    /// Campaign strategy note for the segment
    pub fn strategy(&self) -> &'static str {
        match self {
            Persona::Persuadable => {
                "Highest-ROI segment. Prioritize for all discount-based campaigns."
            }
            Persona::SureThing => {
                "Engage with loyalty programs or new product announcements instead of discounts."
            }
            Persona::DoNotDisturb => {
                "Exclude from promotional campaigns. Over-targeting this segment can cause churn."
            }
            Persona::LostCause => {
                "Very low return on marketing spend. Focus budget on more promising segments."
            }
        }
    }
}

/// Configurable persona classification thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaThresholds {
    /// Uplift score above which a customer is Persuadable
    pub persuadable_min_uplift: f64,
    /// Control probability above which a non-persuadable customer is a Sure Thing
    pub sure_thing_min_control: f64,
    /// Uplift score below which a remaining customer is Do Not Disturb
    pub do_not_disturb_max_uplift: f64,
}

impl Default for PersonaThresholds {
    fn default() -> Self {
        Self {
            persuadable_min_uplift: 0.1,
            sure_thing_min_control: 0.6,
            do_not_disturb_max_uplift: -0.1,
        }
    }
}

/// Conversion probabilities under both arms and their difference
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpliftScore {
    /// Conversion probability with the offer
    pub p_treat: f64,
    /// Conversion probability without the offer
    pub p_ctrl: f64,
    /// Estimated incremental effect of the offer, `p_treat - p_ctrl`
    pub uplift: f64,
}

impl UpliftScore {
    pub fn new(p_treat: f64, p_ctrl: f64) -> Self {
        Self {
            p_treat,
            p_ctrl,
            uplift: p_treat - p_ctrl,
        }
    }
}

/// Analysis result published for each scored profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Unique analysis identifier
    pub analysis_id: String,

    /// Associated profile ID
    pub profile_id: String,

    /// Conversion probability with the offer (0.0 - 1.0)
    pub p_treat: f64,

    /// Conversion probability without the offer (0.0 - 1.0)
    pub p_ctrl: f64,

    /// Uplift score, `p_treat - p_ctrl` (-1.0 - 1.0)
    pub uplift_score: f64,

    /// Persona segment classification
    pub persona: Persona,

    /// Targeting recommendation for the segment
    pub recommendation: String,

    /// Result generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// Create a new analysis result
    pub fn new(profile_id: String, score: UpliftScore, persona: Persona) -> Self {
        Self {
            analysis_id: uuid::Uuid::new_v4().to_string(),
            profile_id,
            p_treat: score.p_treat,
            p_ctrl: score.p_ctrl,
            uplift_score: score.uplift,
            persona,
            recommendation: persona.recommendation().to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(probs: (f64, f64)) -> Persona {
        let (p_treat, p_ctrl) = probs;
        let score = UpliftScore::new(p_treat, p_ctrl);
        Persona::from_score(&score, &PersonaThresholds::default())
    }

    #[test]
    fn test_persona_from_score() {
        // p_treat 0.7, p_ctrl 0.5 -> uplift 0.2
        assert_eq!(classify((0.7, 0.5)), Persona::Persuadable);
        // uplift 0.03, p_ctrl 0.62
        assert_eq!(classify((0.65, 0.62)), Persona::SureThing);
        // uplift -0.15
        assert_eq!(classify((0.1, 0.25)), Persona::DoNotDisturb);
        // uplift -0.02, p_ctrl 0.22
        assert_eq!(classify((0.2, 0.22)), Persona::LostCause);
    }

    #[test]
    fn test_boundaries_are_strict() {
        // p_ctrl 0.0 keeps the subtraction exact: uplift == 0.1, not Persuadable
        assert_eq!(classify((0.1, 0.0)), Persona::LostCause);
        // p_ctrl exactly 0.6 is not Sure Thing
        assert_eq!(classify((0.62, 0.6)), Persona::LostCause);
        // uplift exactly -0.1 is not Do Not Disturb
        assert_eq!(classify((0.0, 0.1)), Persona::LostCause);
    }

    #[test]
    fn test_rule_order_precedence() {
        // High uplift wins even when control probability is also high
        assert_eq!(classify((0.95, 0.8)), Persona::Persuadable);
        let score = UpliftScore::new(0.95, 0.8);
        assert!((score.uplift - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let score = UpliftScore::new(0.55, 0.48);
        let thresholds = PersonaThresholds::default();
        let first = Persona::from_score(&score, &thresholds);
        for _ in 0..10 {
            assert_eq!(Persona::from_score(&score, &thresholds), first);
        }
    }

    #[test]
    fn test_analysis_result_serialization() {
        let score = UpliftScore::new(0.7, 0.5);
        let persona = Persona::from_score(&score, &PersonaThresholds::default());
        let result = AnalysisResult::new("cust_123".to_string(), score, persona);

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: AnalysisResult = serde_json::from_str(&json).unwrap();

        assert_eq!(result.profile_id, deserialized.profile_id);
        assert_eq!(result.uplift_score, deserialized.uplift_score);
        assert_eq!(result.persona, deserialized.persona);
        assert_eq!(deserialized.persona, Persona::Persuadable);
    }
}
