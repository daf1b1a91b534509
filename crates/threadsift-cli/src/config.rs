//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use threadsift_extractor::ExtractorConfig;
use threadsift_graph::GraphConfig;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Generative service settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Batch extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Graph building settings
    #[serde(default)]
    pub graph: GraphConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

/// Which generative service backs a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Canned replies, no network
    Mock,
    /// Local Ollama server
    Ollama,
    /// OpenAI API
    OpenAi,
    /// Azure OpenAI deployment
    Azure,
}

/// Generative service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider kind
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    /// Service endpoint; required for Azure, optional elsewhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model or deployment name
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Azure API version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Attempts per service call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds; later retries double it
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".threadsift").join("config.toml"))
    }

    /// Load configuration from `path` (or the default path); a missing file
    /// yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.extractor.validate()?;
        self.graph.validate().map_err(CliError::Config)?;
        if self.llm.provider == ProviderKind::Azure && self.llm.endpoint.is_none() {
            return Err(CliError::Config(
                "llm.endpoint is required for the azure provider".into(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            model: default_model(),
            api_key_env: default_api_key_env(),
            api_version: None,
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_provider() -> ProviderKind {
    ProviderKind::Ollama
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use threadsift_extractor::ExtractorError;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.llm.provider, ProviderKind::Ollama);
        assert_eq!(config.extractor.max_comments, 10);
        assert_eq!(config.graph.post_label_len, 40);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.llm.model, "llama3");
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[llm]\nprovider = \"openai\"\nmodel = \"gpt-4o-mini\"\n\n[extractor]\nmax_concurrency = 8\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.provider, ProviderKind::OpenAi);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_retries, 3);
        assert_eq!(config.llm.retry_delay_ms, 1000);
        assert_eq!(config.extractor.max_concurrency, 8);
        assert_eq!(config.extractor.extraction_timeout_secs, 120);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.settings.format = OutputFormat::Json;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.settings.format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_sections_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[extractor]\nmax_concurrency = 0\n").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(CliError::Extractor(ExtractorError::Config(_)))
        ));

        fs::write(&path, "[llm]\nprovider = \"azure\"\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(CliError::Config(_))));
    }
}
