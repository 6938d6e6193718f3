//! Run configuration loaded from TOML.
//!
//! A run file pairs a [`ModelConfig`] with a [`SolverConfig`]:
//!
//! ```toml
//! [model]
//! coverage = "exactly_one"
//! hours = false
//!
//! [model.preference]
//! rule = "penalize"
//! penalty = 1000
//!
//! [solver]
//! time_limit_ms = 5000
//! ```
//!
//! Missing sections fall back to [`ModelConfig::general`] and an unlimited
//! solver.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assign::{ModelConfig, ModelVariant};
use crate::cp::SolverConfig;

/// Errors raised while reading configuration or problem files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Model and solver settings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub model: ModelConfig,
    pub solver: SolverConfig,
}

impl RunConfig {
    /// Defaults for a named variant with an unlimited solver.
    pub fn variant(variant: ModelVariant) -> Self {
        Self {
            model: ModelConfig::variant(variant),
            solver: SolverConfig::default(),
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file can't be read, isn't valid TOML, or holds
    /// invalid values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the model configuration.
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// Sets the solver configuration.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Validates both the model and the solver part.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model
            .validate()
            .and_then(|()| self.solver.validate())
            .map_err(ConfigError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::{Coverage, PreferenceRule};

    #[test]
    fn test_empty_is_general() {
        let config = RunConfig::from_toml_str("").unwrap();
        assert_eq!(config.model, ModelConfig::general());
        assert_eq!(config.solver, SolverConfig::default());
    }

    #[test]
    fn test_strict_penalize_file() {
        let config = RunConfig::from_toml_str(
            r#"
            [model]
            coverage = "exactly_one"
            hours = false

            [model.preference]
            rule = "penalize"
            penalty = 250

            [solver]
            time_limit_ms = 5000
            node_limit = 100000
            "#,
        )
        .unwrap();

        assert_eq!(config.model.coverage, Coverage::ExactlyOne);
        assert!(!config.model.hours);
        assert!(config.model.skill_gate);
        assert_eq!(
            config.model.preference,
            PreferenceRule::Penalize { penalty: 250 }
        );
        assert_eq!(config.solver.time_limit_ms, Some(5000));
        assert_eq!(config.solver.node_limit, Some(100_000));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = RunConfig::from_toml_str("[solver]\nnode_limit = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = RunConfig::from_toml_str("[model]\nslot_hours = -3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = RunConfig::from_toml_str("[model\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = RunConfig::load("/nonexistent/u-assign.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_variant_defaults() {
        let config = RunConfig::variant(ModelVariant::Strict);
        assert_eq!(config.model, ModelConfig::strict());
        assert!(config.validate().is_ok());
    }
}
