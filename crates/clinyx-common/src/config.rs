//! Engine configuration.
//!
//! Users can tune the engine via a TOML file (`clinyx.toml`, or the path in the
//! `CLINYX_CONFIG` env var). Every field has a default, so an empty file is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entities::ExtractionParameters;
use crate::error::{ClinyxError, Result};

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Echoed in result metadata; the engine never filters on it
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Run the normalization pass (abbreviation expansion + code lookup)
    #[serde(default = "bool_true")]
    pub enable_normalization: bool,

    /// Radius, in characters, of the context window around each entity
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Maximum start-to-start distance, in characters, for relation pairs
    #[serde(default = "default_relation_window")]
    pub relation_window: usize,

    /// Fixed confidence assigned to inferred relations
    #[serde(default = "default_relation_confidence")]
    pub relation_confidence: f64,

    /// Model name recorded in result metadata
    #[serde(default = "default_processing_model")]
    pub processing_model: String,

    /// Maximum number of document ids kept in the history cache (unbounded if unset)
    #[serde(default)]
    pub history_capacity: Option<usize>,

    /// Maximum documents extracted concurrently within one batch
    #[serde(default = "default_max_concurrent_documents")]
    pub max_concurrent_documents: usize,
}

fn default_confidence_threshold()     -> f64    { 0.5 }
fn bool_true()                        -> bool   { true }
fn default_context_window()           -> usize  { 50 }
fn default_relation_window()          -> usize  { 100 }
fn default_relation_confidence()      -> f64    { 0.7 }
fn default_processing_model()         -> String { "clinyx-rule-ner-v1".to_string() }
fn default_max_concurrent_documents() -> usize  { 8 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            enable_normalization: bool_true(),
            context_window: default_context_window(),
            relation_window: default_relation_window(),
            relation_confidence: default_relation_confidence(),
            processing_model: default_processing_model(),
            history_capacity: None,
            max_concurrent_documents: default_max_concurrent_documents(),
        }
    }
}

impl EngineConfig {
    /// Parse from TOML text and validate.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Load from `CLINYX_CONFIG` or `./clinyx.toml`, falling back to defaults
    /// when neither file exists.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var("CLINYX_CONFIG")
            .unwrap_or_else(|_| "clinyx.toml".to_string());

        if !Path::new(&path).exists() {
            debug!("No config file at {}, using defaults", path);
            return Ok(Self::default());
        }

        Self::load(&path)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ClinyxError::Config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.relation_confidence) {
            return Err(ClinyxError::Config(format!(
                "relation_confidence must be within [0, 1], got {}",
                self.relation_confidence
            )));
        }
        if self.max_concurrent_documents == 0 {
            return Err(ClinyxError::Config(
                "max_concurrent_documents must be at least 1".to_string(),
            ));
        }
        if self.history_capacity == Some(0) {
            return Err(ClinyxError::Config(
                "history_capacity must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// The subset of configuration echoed into each result.
    pub fn extraction_parameters(&self) -> ExtractionParameters {
        ExtractionParameters {
            confidence_threshold: self.confidence_threshold,
            enable_normalization: self.enable_normalization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_toml_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_defaults_match_engine_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.context_window, 50);
        assert_eq!(config.relation_window, 100);
        assert_eq!(config.relation_confidence, 0.7);
        assert!(config.enable_normalization);
        assert!(config.history_capacity.is_none());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = EngineConfig::from_toml_str(
            "confidence_threshold = 0.65\nenable_normalization = false\nhistory_capacity = 100\n",
        )
        .unwrap();
        assert_eq!(config.confidence_threshold, 0.65);
        assert!(!config.enable_normalization);
        assert_eq!(config.history_capacity, Some(100));
        assert_eq!(config.context_window, 50);
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let err = EngineConfig::from_toml_str("confidence_threshold = 1.5").unwrap_err();
        assert!(matches!(err, ClinyxError::Config(_)));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = EngineConfig::from_toml_str("max_concurrent_documents = 0").unwrap_err();
        assert!(matches!(err, ClinyxError::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = EngineConfig::from_toml_str("context_window = \"wide\"").unwrap_err();
        assert!(matches!(err, ClinyxError::ConfigParse(_)));
    }

    #[test]
    fn test_extraction_parameters_echo() {
        let params = EngineConfig::default().extraction_parameters();
        assert_eq!(params.confidence_threshold, 0.5);
        assert!(params.enable_normalization);
    }
}
