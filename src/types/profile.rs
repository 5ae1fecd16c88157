//! Customer profile data structures for uplift scoring

use crate::error::ScoringError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Valid numeric ranges for profile fields, as collected by the front end.
pub const AGE_RANGE: (u32, u32) = (18, 70);
pub const RECENCY_RANGE: (u32, u32) = (1, 365);
pub const TOTAL_SPEND_RANGE: (f64, f64) = (0.0, 1000.0);
pub const PAGES_VIEWED_RANGE: (u32, u32) = (1, 100);

/// Represents a customer profile to be scored for offer uplift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    /// Unique profile/request identifier
    pub profile_id: String,

    /// Age in years
    pub age: u32,

    /// Days since last visit
    pub recency: u32,

    /// Total spend to date
    pub total_spend: f64,

    /// Pages viewed in the current period
    pub pages_viewed: u32,

    /// Whether this is a newly acquired customer
    pub is_new_customer: bool,

    /// Platform the customer uses (validated against the configured set)
    pub platform: String,

    /// Region/state the customer belongs to (validated against the configured set)
    pub state: String,

    /// Timestamp (optional, for real-time processing)
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl CustomerProfile {
    /// Create a new profile with mid-range defaults for optional fields
    pub fn new(profile_id: String, age: u32, state: &str, platform: &str) -> Self {
        Self {
            profile_id,
            age,
            recency: 50,
            total_spend: 200.0,
            pages_viewed: 15,
            is_new_customer: false,
            platform: platform.to_string(),
            state: state.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Check that every numeric field is inside its documented range.
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.age < AGE_RANGE.0 || self.age > AGE_RANGE.1 {
            return Err(ScoringError::FeatureAlignment(format!(
                "age {} outside [{}, {}]",
                self.age, AGE_RANGE.0, AGE_RANGE.1
            )));
        }
        if self.recency < RECENCY_RANGE.0 || self.recency > RECENCY_RANGE.1 {
            return Err(ScoringError::FeatureAlignment(format!(
                "recency {} outside [{}, {}]",
                self.recency, RECENCY_RANGE.0, RECENCY_RANGE.1
            )));
        }
        if self.total_spend < TOTAL_SPEND_RANGE.0 || self.total_spend > TOTAL_SPEND_RANGE.1 {
            return Err(ScoringError::FeatureAlignment(format!(
                "total_spend {} outside [{}, {}]",
                self.total_spend, TOTAL_SPEND_RANGE.0, TOTAL_SPEND_RANGE.1
            )));
        }
        if self.pages_viewed < PAGES_VIEWED_RANGE.0 || self.pages_viewed > PAGES_VIEWED_RANGE.1 {
            return Err(ScoringError::FeatureAlignment(format!(
                "pages_viewed {} outside [{}, {}]",
                self.pages_viewed, PAGES_VIEWED_RANGE.0, PAGES_VIEWED_RANGE.1
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_serialization() {
        let profile = CustomerProfile::new("cust_123".to_string(), 35, "Delhi", "Web");

        let json = serde_json::to_string(&profile).unwrap();
        let deserialized: CustomerProfile = serde_json::from_str(&json).unwrap();

        assert_eq!(profile.profile_id, deserialized.profile_id);
        assert_eq!(profile.age, deserialized.age);
        assert_eq!(profile.state, deserialized.state);
    }

    #[test]
    fn test_validate_accepts_mid_range() {
        let profile = CustomerProfile::new("cust_001".to_string(), 35, "Kerala", "iOS");
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut profile = CustomerProfile::new("cust_002".to_string(), 17, "Kerala", "iOS");
        assert!(profile.validate().is_err());

        profile.age = 35;
        profile.recency = 0;
        assert!(profile.validate().is_err());

        profile.recency = 50;
        profile.total_spend = 1500.0;
        assert!(profile.validate().is_err());
    }
}
