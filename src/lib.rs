//! Uplift Scoring Engine Library
//!
//! Estimates the incremental effect of a marketing offer on conversion
//! probability by running two pre-trained classifiers (treatment and
//! control arms) over the same feature vector, and classifies each
//! customer into an actionable persona segment.

pub mod config;
pub mod consumer;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod producer;
pub mod schema;
pub mod types;

pub use config::AppConfig;
pub use consumer::ProfileConsumer;
pub use error::ScoringError;
pub use features::FeatureEncoder;
pub use models::scoring::UpliftScorer;
pub use producer::ResultProducer;
pub use schema::{FeatureSchema, FeatureVector};
pub use types::{analysis::AnalysisResult, analysis::Persona, profile::CustomerProfile};
