use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extractor::DEFAULT_MIN_KEYWORD_LENGTH;
use crate::matcher::{
    DEFAULT_CLUSTERING_FACTOR, DEFAULT_MAX_SUGGESTIONS, DEFAULT_MIN_CONFIDENCE_THRESHOLD,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("min_keyword_length must be at least 1, got {0}")]
    MinKeywordLength(usize),
    #[error("clustering_factor must be finite and non-negative, got {0}")]
    ClusteringFactor(f64),
    #[error("min_confidence_threshold must be within [0, 100], got {0}")]
    ConfidenceThreshold(f64),
    #[error("max_suggestions must be at least 1")]
    MaxSuggestions,
}

/// Tuning knobs for extraction and matching. Every field has a default, so
/// an empty TOML document is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Shortest keyword the extractor keeps.
    #[serde(default = "default_min_keyword_length")]
    pub min_keyword_length: usize,
    /// Stopwords layered on top of the built-in English table.
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
    /// Score bonus per extra distinct matched keyword.
    #[serde(default = "default_clustering_factor")]
    pub clustering_factor: f64,
    /// Matches below this confidence percentage are discarded.
    #[serde(default = "default_min_confidence_threshold")]
    pub min_confidence_threshold: f64,
    /// Result list length when the caller does not pass a limit.
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: u32,
}

fn default_min_keyword_length() -> usize {
    DEFAULT_MIN_KEYWORD_LENGTH
}

fn default_clustering_factor() -> f64 {
    DEFAULT_CLUSTERING_FACTOR
}

fn default_min_confidence_threshold() -> f64 {
    DEFAULT_MIN_CONFIDENCE_THRESHOLD
}

fn default_max_suggestions() -> u32 {
    DEFAULT_MAX_SUGGESTIONS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_keyword_length: default_min_keyword_length(),
            extra_stopwords: Vec::new(),
            clustering_factor: default_clustering_factor(),
            min_confidence_threshold: default_min_confidence_threshold(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document and validates the result.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_keyword_length < 1 {
            return Err(ConfigError::MinKeywordLength(self.min_keyword_length));
        }
        if !self.clustering_factor.is_finite() || self.clustering_factor < 0.0 {
            return Err(ConfigError::ClusteringFactor(self.clustering_factor));
        }
        if !(0.0..=100.0).contains(&self.min_confidence_threshold) {
            return Err(ConfigError::ConfidenceThreshold(self.min_confidence_threshold));
        }
        if self.max_suggestions < 1 {
            return Err(ConfigError::MaxSuggestions);
        }
        Ok(())
    }
}
