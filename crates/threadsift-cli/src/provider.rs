//! Construct the configured generative service provider.

use crate::config::{LlmSettings, ProviderKind};
use crate::error::{CliError, Result};
use std::time::Duration;
use threadsift_domain::{ExtractionPrompt, LlmProvider};
use threadsift_llm::{LlmError, MockProvider, OllamaProvider, OpenAiCompatProvider};
use tracing::debug;

const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";

/// Reply the mock provider gives to every prompt
const MOCK_REPLY: &str = r#"{"content": "mock feedback", "type": "opinion", "sentiment": "neutral", "severity": "low", "resolved": false, "resolve_text": ""}"#;

/// Any provider the CLI can drive
pub enum AnyProvider {
    /// Canned replies
    Mock(MockProvider),
    /// Local Ollama
    Ollama(OllamaProvider),
    /// OpenAI or Azure OpenAI
    OpenAi(OpenAiCompatProvider),
}

impl AnyProvider {
    /// Build the provider described by `settings`
    ///
    /// API keys are read from the environment variable named in `settings`.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        debug!(provider = ?settings.provider, model = %settings.model, "building provider");
        let provider = match settings.provider {
            ProviderKind::Mock => AnyProvider::Mock(MockProvider::new(MOCK_REPLY)),
            ProviderKind::Ollama => {
                let provider = match &settings.endpoint {
                    Some(endpoint) => OllamaProvider::new(endpoint, &settings.model)?,
                    None => OllamaProvider::default_endpoint(&settings.model)?,
                };
                AnyProvider::Ollama(
                    provider
                        .with_max_retries(settings.max_retries)
                        .with_retry_delay(retry_delay(settings)),
                )
            }
            ProviderKind::OpenAi => {
                let mut provider =
                    OpenAiCompatProvider::openai(api_key(settings)?, &settings.model)?;
                if let Some(endpoint) = &settings.endpoint {
                    provider = provider.with_base_url(endpoint);
                }
                AnyProvider::OpenAi(
                    provider
                        .with_max_retries(settings.max_retries)
                        .with_retry_delay(retry_delay(settings)),
                )
            }
            ProviderKind::Azure => {
                let endpoint = settings.endpoint.as_deref().ok_or_else(|| {
                    CliError::Config("llm.endpoint is required for the azure provider".into())
                })?;
                let api_version = settings
                    .api_version
                    .as_deref()
                    .unwrap_or(DEFAULT_AZURE_API_VERSION);
                let provider = OpenAiCompatProvider::azure(
                    endpoint,
                    &settings.model,
                    api_version,
                    api_key(settings)?,
                )?;
                AnyProvider::OpenAi(
                    provider
                        .with_max_retries(settings.max_retries)
                        .with_retry_delay(retry_delay(settings)),
                )
            }
        };
        Ok(provider)
    }
}

fn retry_delay(settings: &LlmSettings) -> Duration {
    Duration::from_millis(settings.retry_delay_ms)
}

fn api_key(settings: &LlmSettings) -> Result<String> {
    std::env::var(&settings.api_key_env).map_err(|_| {
        CliError::Config(format!(
            "environment variable {} is not set",
            settings.api_key_env
        ))
    })
}

impl LlmProvider for AnyProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &ExtractionPrompt) -> std::result::Result<String, Self::Error> {
        match self {
            AnyProvider::Mock(p) => p.generate(prompt),
            AnyProvider::Ollama(p) => p.generate(prompt),
            AnyProvider::OpenAi(p) => p.generate(prompt),
        }
    }

    fn model_name(&self) -> &str {
        match self {
            AnyProvider::Mock(p) => p.model_name(),
            AnyProvider::Ollama(p) => p.model_name(),
            AnyProvider::OpenAi(p) => p.model_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider() {
        let settings = LlmSettings {
            provider: ProviderKind::Mock,
            ..LlmSettings::default()
        };
        let provider = AnyProvider::from_settings(&settings).unwrap();
        assert_eq!(provider.model_name(), "mock");

        let reply = provider
            .generate(&ExtractionPrompt::new("system", "user"))
            .unwrap();
        assert!(reply.contains("mock feedback"));
    }

    #[test]
    fn test_ollama_provider_uses_configured_model() {
        let settings = LlmSettings {
            provider: ProviderKind::Ollama,
            endpoint: Some("http://127.0.0.1:11434".into()),
            model: "mistral".into(),
            ..LlmSettings::default()
        };
        let provider = AnyProvider::from_settings(&settings).unwrap();
        assert_eq!(provider.model_name(), "mistral");
    }

    #[test]
    fn test_missing_api_key() {
        let settings = LlmSettings {
            provider: ProviderKind::OpenAi,
            api_key_env: "THREADSIFT_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..LlmSettings::default()
        };
        let result = AnyProvider::from_settings(&settings);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_azure_requires_endpoint() {
        let settings = LlmSettings {
            provider: ProviderKind::Azure,
            endpoint: None,
            ..LlmSettings::default()
        };
        assert!(matches!(
            AnyProvider::from_settings(&settings),
            Err(CliError::Config(_))
        ));
    }
}
