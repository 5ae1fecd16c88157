//! Feature encoding for uplift model inference.
//!
//! Transforms a customer profile into the named feature vector the
//! models were trained on: numeric fields pass through, categorical
//! fields are one-hot encoded against the configured category lists.

use crate::config::EncodingConfig;
use crate::error::ScoringError;
use crate::schema::FeatureVector;
use crate::types::profile::CustomerProfile;

/// Encoder that turns profiles into named feature vectors.
///
/// The category lists are configuration data versioned alongside the
/// model artifacts; the encoding must match what the models saw during
/// training. The first platform in the list is the reference category
/// and gets no indicator column.
pub struct FeatureEncoder {
    states: Vec<String>,
    platforms: Vec<String>,
}

impl FeatureEncoder {
    /// Create an encoder from the configured category lists.
    pub fn new(encoding: &EncodingConfig) -> Self {
        Self {
            states: encoding.states.clone(),
            platforms: encoding.platforms.clone(),
        }
    }

    /// Encode a profile into a named feature vector.
    ///
    /// Numeric fields are range-checked and categorical values must be
    /// members of the configured lists; violations fail the request.
    pub fn encode(&self, profile: &CustomerProfile) -> Result<FeatureVector, ScoringError> {
        profile.validate()?;

        if !self.states.iter().any(|s| s == &profile.state) {
            return Err(ScoringError::FeatureAlignment(format!(
                "unrecognized state `{}`",
                profile.state
            )));
        }
        if !self.platforms.iter().any(|p| p == &profile.platform) {
            return Err(ScoringError::FeatureAlignment(format!(
                "unrecognized platform `{}`",
                profile.platform
            )));
        }

        let mut features = FeatureVector::with_capacity(self.feature_count());

        // Numeric and boolean fields, in training order
        features.push("age", profile.age as f32);
        features.push(
            "is_new_customer",
            if profile.is_new_customer { 1.0 } else { 0.0 },
        );
        features.push("total_spend", profile.total_spend as f32);
        features.push("recency", profile.recency as f32);
        features.push("pages_viewed", profile.pages_viewed as f32);

        // One-hot states: every configured state gets a column
        for state in &self.states {
            let value = if state == &profile.state { 1.0 } else { 0.0 };
            features.push(format!("state_{}", state), value);
        }

        // Baseline-drop one-hot platforms: the first platform is implicit
        // in the all-zeros encoding
        for platform in self.platforms.iter().skip(1) {
            let value = if platform == &profile.platform { 1.0 } else { 0.0 };
            features.push(format!("platform_{}", platform), value);
        }

        Ok(features)
    }

    /// Number of features produced per profile.
    pub fn feature_count(&self) -> usize {
        5 + self.states.len() + self.platforms.len().saturating_sub(1)
    }

    /// Names of the produced features, in encoding order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = vec![
            "age".to_string(),
            "is_new_customer".to_string(),
            "total_spend".to_string(),
            "recency".to_string(),
            "pages_viewed".to_string(),
        ];
        names.extend(self.states.iter().map(|s| format!("state_{}", s)));
        names.extend(
            self.platforms
                .iter()
                .skip(1)
                .map(|p| format!("platform_{}", p)),
        );
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncodingConfig;
    use crate::schema::FeatureSchema;
    use crate::types::profile::CustomerProfile;

    fn encoder() -> FeatureEncoder {
        FeatureEncoder::new(&EncodingConfig::default())
    }

    #[test]
    fn test_feature_count() {
        let encoder = encoder();
        // 5 numeric + 20 states + 2 platform indicators (Android is baseline)
        assert_eq!(encoder.feature_count(), 27);
        assert_eq!(encoder.feature_names().len(), 27);
    }

    #[test]
    fn test_encode_numeric_passthrough() {
        let mut profile = CustomerProfile::new("cust_001".to_string(), 35, "Delhi", "Web");
        profile.total_spend = 200.0;
        profile.recency = 50;
        profile.pages_viewed = 15;
        profile.is_new_customer = true;

        let features = encoder().encode(&profile).unwrap();
        assert_eq!(features.get("age"), Some(35.0));
        assert_eq!(features.get("is_new_customer"), Some(1.0));
        assert_eq!(features.get("total_spend"), Some(200.0));
        assert_eq!(features.get("recency"), Some(50.0));
        assert_eq!(features.get("pages_viewed"), Some(15.0));
    }

    #[test]
    fn test_encode_one_hot_state() {
        let profile = CustomerProfile::new("cust_002".to_string(), 35, "Delhi", "Web");
        let features = encoder().encode(&profile).unwrap();

        assert_eq!(features.get("state_Delhi"), Some(1.0));
        assert_eq!(features.get("state_Kerala"), Some(0.0));
        let hot: f32 = EncodingConfig::default()
            .states
            .iter()
            .map(|s| features.get(&format!("state_{}", s)).unwrap())
            .sum();
        assert_eq!(hot, 1.0);
    }

    #[test]
    fn test_encode_platform_baseline_drop() {
        let encoder = encoder();

        // Android is the reference category: both indicators zero
        let android = CustomerProfile::new("cust_003".to_string(), 35, "Delhi", "Android");
        let features = encoder.encode(&android).unwrap();
        assert_eq!(features.get("platform_Android"), None);
        assert_eq!(features.get("platform_iOS"), Some(0.0));
        assert_eq!(features.get("platform_Web"), Some(0.0));

        let ios = CustomerProfile::new("cust_004".to_string(), 35, "Delhi", "iOS");
        let features = encoder.encode(&ios).unwrap();
        assert_eq!(features.get("platform_iOS"), Some(1.0));
        assert_eq!(features.get("platform_Web"), Some(0.0));
    }

    #[test]
    fn test_encode_rejects_unknown_categories() {
        let encoder = encoder();

        let bad_state = CustomerProfile::new("cust_005".to_string(), 35, "Atlantis", "Web");
        assert!(encoder.encode(&bad_state).is_err());

        let bad_platform = CustomerProfile::new("cust_006".to_string(), 35, "Delhi", "Desktop");
        assert!(encoder.encode(&bad_platform).is_err());
    }

    #[test]
    fn test_encoded_names_match_schema_for_every_category() {
        let encoder = encoder();
        let schema = FeatureSchema::new(encoder.feature_names());
        let config = EncodingConfig::default();

        for state in &config.states {
            for platform in &config.platforms {
                let profile =
                    CustomerProfile::new("cust_x".to_string(), 35, state, platform);
                let features = encoder.encode(&profile).unwrap();
                let names: Vec<&str> = features.names().collect();
                assert_eq!(names, schema.names().iter().map(|s| s.as_str()).collect::<Vec<_>>());
                assert_eq!(features.align(&schema).len(), schema.len());
            }
        }
    }
}
