//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local chat API, for running extraction
//! against a local model.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama `/api/chat` endpoint
//! - Configurable endpoint and model
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use threadsift_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3").unwrap();
//! ```

use crate::retry::with_backoff;
use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use threadsift_domain::{ExtractionPrompt, LlmProvider};
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Create a new Ollama provider on `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the delay before the first retry; later retries double it
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Send a chat request to Ollama
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - Network communication fails
    /// - Response format is invalid or empty
    pub async fn chat(&self, prompt: &ExtractionPrompt) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);
        let request_body = OllamaChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &prompt.system },
                ChatMessage { role: "user", content: &prompt.user },
            ],
            stream: false,
        };

        debug!(model = %self.model, "Ollama chat request");

        let (url, body) = (&url, &request_body);
        let content = with_backoff(self.max_retries, self.retry_delay, move || async move {
            let response = self
                .client
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(LlmError::ModelNotAvailable(self.model.clone()));
            }
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
            }

            response
                .json::<OllamaChatResponse>()
                .await
                .map(|r| r.message.content)
                .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
        })
        .await?;

        if content.trim().is_empty() {
            return Err(LlmError::EmptyResponse(self.model.clone()));
        }
        Ok(content)
    }
}

impl LlmProvider for OllamaProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &ExtractionPrompt) -> Result<String, Self::Error> {
        crate::block_on(self.chat(prompt))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
