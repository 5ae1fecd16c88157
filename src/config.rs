//! Configuration management for the uplift scoring engine

use crate::types::analysis::PersonaThresholds;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub models: ModelsConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub personas: PersonaThresholds,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming customer profiles
    pub profile_subject: String,
    /// Subject for outgoing analysis results
    pub result_subject: String,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory containing the ONNX model artifacts
    pub models_dir: String,
    /// Treatment-arm model filename (conversion probability with offer)
    #[serde(default = "default_treatment_model")]
    pub treatment_model: String,
    /// Control-arm model filename (conversion probability without offer)
    #[serde(default = "default_control_model")]
    pub control_model: String,
    /// Number of threads for ONNX inference per model (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_treatment_model() -> String {
    "model_treat.onnx".to_string()
}

fn default_control_model() -> String {
    "model_ctrl.onnx".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

/// Categorical encoding configuration.
///
/// These lists are versioned together with the model artifacts: the
/// one-hot encoding must match what the models were trained on. The
/// first platform is the baseline category and gets no indicator column.
#[derive(Debug, Clone, Deserialize)]
pub struct EncodingConfig {
    /// Recognized state categories
    #[serde(default = "default_states")]
    pub states: Vec<String>,
    /// Recognized platform categories, baseline first
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            states: default_states(),
            platforms: default_platforms(),
        }
    }
}

fn default_states() -> Vec<String> {
    [
        "Andhra Pradesh",
        "Assam",
        "Bihar",
        "Chhattisgarh",
        "Delhi",
        "Gujarat",
        "Haryana",
        "Jammu and Kashmir",
        "Jharkhand",
        "Karnataka",
        "Kerala",
        "Madhya Pradesh",
        "Maharashtra",
        "Odisha",
        "Punjab",
        "Rajasthan",
        "Tamil Nadu",
        "Telangana",
        "Uttar Pradesh",
        "West Bengal",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_platforms() -> Vec<String> {
    ["Android", "iOS", "Web"].iter().map(|s| s.to_string()).collect()
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of worker tasks for the service loop
    pub workers: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                profile_subject: "uplift.profiles".to_string(),
                result_subject: "uplift.results".to_string(),
            },
            models: ModelsConfig {
                models_dir: "models".to_string(),
                treatment_model: default_treatment_model(),
                control_model: default_control_model(),
                onnx_threads: 1,
            },
            encoding: EncodingConfig::default(),
            personas: PersonaThresholds::default(),
            pipeline: PipelineConfig { workers: 4 },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.models.treatment_model, "model_treat.onnx");
        assert_eq!(config.models.control_model, "model_ctrl.onnx");
        assert_eq!(config.encoding.states.len(), 20);
        assert_eq!(config.encoding.platforms.len(), 3);
        assert_eq!(config.encoding.platforms[0], "Android");
    }

    #[test]
    fn test_default_persona_thresholds() {
        let thresholds = PersonaThresholds::default();
        assert_eq!(thresholds.persuadable_min_uplift, 0.1);
        assert_eq!(thresholds.sure_thing_min_control, 0.6);
        assert_eq!(thresholds.do_not_disturb_max_uplift, -0.1);
    }
}
