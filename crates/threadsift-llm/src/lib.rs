//! Threadsift LLM Provider Layer
//!
//! Pluggable generative-text service adapters.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from
//! `threadsift-domain`. Every provider takes an [`ExtractionPrompt`] (a system
//! instruction plus a user message) and returns the raw reply text. Retries
//! and timeouts belong here; the parser downstream treats a retried reply
//! exactly like a first-attempt one.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama chat API
//! - `OpenAiCompatProvider`: OpenAI and Azure OpenAI chat completions
//!
//! # Examples
//!
//! ```
//! use threadsift_llm::MockProvider;
//! use threadsift_domain::{ExtractionPrompt, LlmProvider};
//!
//! let provider = MockProvider::new(r#"{"content": "ok"}"#);
//! let prompt = ExtractionPrompt::new("system", "user");
//! assert_eq!(provider.generate(&prompt).unwrap(), r#"{"content": "ok"}"#);
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;
mod retry;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use threadsift_domain::{ExtractionPrompt, LlmProvider};

pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The service answered with no text
    #[error("Empty response from model '{0}'")]
    EmptyResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Missing or unusable provider configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether another attempt might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::RateLimitExceeded)
    }
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured replies without making any network calls. A reply
/// registered with [`MockProvider::add_response`] is returned for every prompt
/// whose user message contains the given key, which lets tests address one
/// thread in a batch by its id or title.
///
/// # Examples
///
/// ```
/// use threadsift_llm::MockProvider;
/// use threadsift_domain::{ExtractionPrompt, LlmProvider};
///
/// let mut provider = MockProvider::default();
/// provider.add_response("title: Crash", "crash reply");
///
/// let prompt = ExtractionPrompt::new("sys", "title: Crash on boot");
/// assert_eq!(provider.generate(&prompt).unwrap(), "crash reply");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, MockReply>>>,
    call_count: Arc<Mutex<usize>>,
    model: String,
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            model: "mock".to_string(),
        }
    }

    /// Add a specific response for prompts whose user message contains `key`
    pub fn add_response(&mut self, key: impl Into<String>, response: impl Into<String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(key.into(), MockReply::Text(response.into()));
        }
    }

    /// Configure to return an error for prompts containing `key`
    pub fn add_error(&mut self, key: impl Into<String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(key.into(), MockReply::Error);
        }
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.call_count.lock().map(|c| *c).unwrap_or(0)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        if let Ok(mut count) = self.call_count.lock() {
            *count = 0;
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &ExtractionPrompt) -> Result<String, Self::Error> {
        if let Ok(mut count) = self.call_count.lock() {
            *count += 1;
        }

        let responses = self
            .responses
            .lock()
            .map_err(|e| LlmError::Other(format!("Mock lock poisoned: {}", e)))?;

        // Longest key wins so that "thread-10" is not shadowed by "thread-1"
        let matched = responses
            .iter()
            .filter(|(key, _)| prompt.user.contains(key.as_str()))
            .max_by_key(|(key, _)| key.len());

        match matched {
            Some((_, MockReply::Text(response))) => Ok(response.clone()),
            Some((_, MockReply::Error)) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Run a future to completion from synchronous provider code
///
/// Providers are called from blocking worker threads, so a fresh
/// current-thread runtime is safe here.
pub(crate) fn block_on<F, T>(future: F) -> Result<T, LlmError>
where
    F: std::future::Future<Output = Result<T, LlmError>>,
{
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?
        .block_on(future)
}
