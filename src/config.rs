//! Configuration management for the guardian engine

use std::path::Path;

use config::{Config, File};
use serde::Deserialize;

use crate::error::GuardianError;
use crate::rules::{PhysicsConfig, RuleLimits};

/// Engine configuration, usually read from `config/engine.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Hardware safety envelope for the rule validator
    #[serde(default)]
    pub limits: RuleLimits,

    /// Physics reconciliation tuning
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// Classifier artifact settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Logging settings, applied by the embedding service
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Classifier artifact configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX artifact
    #[serde(default = "default_model_path")]
    pub path: String,

    /// Number of threads for ONNX inference
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

fn default_model_path() -> String {
    "models/fraud_model.onnx".to_string()
}

fn default_intra_threads() -> usize {
    1
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            intra_threads: default_intra_threads(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, GuardianError> {
        Self::load_from_path("config/engine.toml")
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, GuardianError> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
