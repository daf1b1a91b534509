//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default quarantine log location, relative to the working directory
pub const DEFAULT_QUARANTINE_PATH: &str = "bad_feedback.txt";

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum number of threads extracted at the same time
    pub max_concurrency: usize,

    /// Maximum time for a single service call (seconds)
    pub extraction_timeout_secs: u64,

    /// Maximum comments per thread included in the prompt
    pub max_comments: usize,

    /// Append-only log for replies no recovery stage could decode
    pub quarantine_path: PathBuf,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        let problem = if self.max_concurrency == 0 {
            "max_concurrency must be greater than 0"
        } else if self.extraction_timeout_secs == 0 {
            "extraction_timeout_secs must be greater than 0"
        } else if self.quarantine_path.as_os_str().is_empty() {
            "quarantine_path must not be empty"
        } else {
            return Ok(());
        };
        Err(ExtractorError::Config(problem.to_string()))
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            extraction_timeout_secs: 120,
            max_comments: 10,
            quarantine_path: PathBuf::from(DEFAULT_QUARANTINE_PATH),
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: more parallel calls, shorter timeouts, fewer comments
    pub fn aggressive() -> Self {
        Self {
            max_concurrency: 16,
            extraction_timeout_secs: 30,
            max_comments: 5,
            ..Self::default()
        }
    }

    /// Lenient preset: serial calls with long timeouts, for rate-limited services
    pub fn lenient() -> Self {
        Self {
            max_concurrency: 1,
            extraction_timeout_secs: 300,
            max_comments: 20,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_comments, 10);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::aggressive().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_concurrency() {
        let config = ExtractorConfig {
            max_concurrency: 0,
            ..ExtractorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_invalid_timeout() {
        let config = ExtractorConfig {
            extraction_timeout_secs: 0,
            ..ExtractorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_from_toml_validates() {
        let err = ExtractorConfig::from_toml("max_concurrency = 0").unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));

        let err = ExtractorConfig::from_toml("max_concurrency = \"four\"").unwrap_err();
        assert!(matches!(err, ExtractorError::Config(_)));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("max_concurrency = 8").unwrap();
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.extraction_timeout_secs, 120);
        assert_eq!(config.quarantine_path, PathBuf::from(DEFAULT_QUARANTINE_PATH));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::aggressive();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
