//! OpenAI-compatible chat completions provider
//!
//! Talks to the OpenAI `/chat/completions` API, or to an Azure OpenAI
//! deployment of the same API.
//!
//! # Examples
//!
//! ```no_run
//! use threadsift_llm::OpenAiCompatProvider;
//!
//! let openai = OpenAiCompatProvider::openai("sk-...", "gpt-4o").unwrap();
//!
//! let azure = OpenAiCompatProvider::azure(
//!     "https://example.openai.azure.com",
//!     "gpt-4o",
//!     "2025-01-01-preview",
//!     "azure-key",
//! )
//! .unwrap();
//! ```

use crate::retry::with_backoff;
use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use threadsift_domain::{ExtractionPrompt, LlmProvider};
use tracing::debug;

/// Default OpenAI API base URL
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Default timeout for chat requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// How requests are addressed and authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
enum Flavor {
    /// `Authorization: Bearer` against `{base}/chat/completions`
    OpenAi,
    /// `api-key` header against a deployment URL with an `api-version` query
    Azure { api_version: String },
}

/// Chat completions provider for OpenAI and Azure OpenAI
pub struct OpenAiCompatProvider {
    base_url: String,
    model: String,
    api_key: String,
    flavor: Flavor,
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
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatProvider {
    fn build(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        flavor: Flavor,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            flavor,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Provider for the public OpenAI API
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::build(OPENAI_API_URL, model, api_key, Flavor::OpenAi)
    }

    /// Provider for an Azure OpenAI deployment
    ///
    /// `deployment` doubles as the model name reported in run metadata.
    pub fn azure(
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Self::build(
            endpoint,
            deployment,
            api_key,
            Flavor::Azure {
                api_version: api_version.into(),
            },
        )
    }

    /// Point an OpenAI-flavored provider at another compatible server
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
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

    fn completions_url(&self) -> String {
        match &self.flavor {
            Flavor::OpenAi => format!("{}/chat/completions", self.base_url),
            Flavor::Azure { api_version } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url, self.model, api_version
            ),
        }
    }

    /// Send a chat completion request and return the first choice's text
    pub async fn chat(&self, prompt: &ExtractionPrompt) -> Result<String, LlmError> {
        let url = self.completions_url();
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &prompt.system },
                ChatMessage { role: "user", content: &prompt.user },
            ],
        };

        debug!(model = %self.model, "chat completion request");

        let (url, body) = (&url, &request_body);
        let response = with_backoff(self.max_retries, self.retry_delay, move || async move {
            let request = self.client.post(url).json(body);
            let request = match self.flavor {
                Flavor::OpenAi => request.bearer_auth(&self.api_key),
                Flavor::Azure { .. } => request.header("api-key", &self.api_key),
            };

            let response = request
                .send()
                .await
                .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(LlmError::RateLimitExceeded);
            }
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
                .json::<ChatResponse>()
                .await
                .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
        })
        .await?;

        first_choice_content(response).ok_or_else(|| LlmError::EmptyResponse(self.model.clone()))
    }
}

fn first_choice_content(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
}

impl LlmProvider for OpenAiCompatProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &ExtractionPrompt) -> Result<String, Self::Error> {
        crate::block_on(self.chat(prompt))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
