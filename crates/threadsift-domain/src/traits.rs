//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline core and its
//! collaborators. Implementations live in other crates.

use crate::ExtractionPrompt;

/// Trait for generative text services
///
/// Implemented by the infrastructure layer (threadsift-llm). Latency, retries
/// and transport failures are the implementor's concern; callers only see
/// the reply text or an error.
pub trait LlmProvider {
    /// Error type for service calls
    type Error;

    /// Send a prompt and return the service's raw reply
    fn generate(&self, prompt: &ExtractionPrompt) -> Result<String, Self::Error>;

    /// Name of the model answering, for run metadata
    fn model_name(&self) -> &str;
}

/// Append-only sink for replies that no recovery stage could decode
///
/// Implementations must write each record as a unit: the raw text followed by
/// a line containing exactly `---`. Concurrent callers share one sink, so
/// writes have to be serialized internally. `record` may block on I/O; async
/// callers invoke it from the blocking pool.
pub trait QuarantineSink: Send + Sync {
    /// Append one record
    fn record(&self, raw: &str) -> std::io::Result<()>;

    /// Flush buffered records
    fn flush(&self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Separator line terminating every quarantine record
pub const QUARANTINE_SEPARATOR: &str = "---";
