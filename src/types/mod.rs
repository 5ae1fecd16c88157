//! Type definitions for the uplift scoring engine

pub mod analysis;
pub mod profile;

pub use analysis::{AnalysisResult, Persona, PersonaThresholds, UpliftScore};
pub use profile::CustomerProfile;
