//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
///
/// Decode failures are not represented here: a reply that no recovery stage
/// can decode is quarantined and mapped to an all-unknown record instead.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The generative text service failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// The service did not answer within the configured timeout
    #[error("Extraction timeout after {0}s")]
    Timeout(u64),

    /// The quarantine log could not be opened or closed
    #[error("Quarantine error: {0}")]
    Quarantine(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A worker task died before producing a result
    #[error("Worker task failed: {0}")]
    Worker(String),
}

impl ExtractorError {
    /// Whether the error came from the generative service boundary
    pub fn is_service_failure(&self) -> bool {
        matches!(self, ExtractorError::Llm(_) | ExtractorError::Timeout(_))
    }
}
