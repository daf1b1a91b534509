//! Threadsift Extractor
//!
//! Turns discussion threads into typed feedback rows using a generative
//! text service.
//!
//! # Overview
//!
//! Each thread is rendered into a prompt, sent to the service once, and the
//! reply is run through a recovery chain that tolerates the usual ways a
//! model drifts from strict JSON. Replies nothing can decode are appended to
//! a quarantine log and still produce a row, with every classification
//! field unknown.
//!
//! # Architecture
//!
//! ```text
//! Thread → PromptBuilder → LlmProvider → RecoveryChain → FeedbackRow
//!                                              │
//!                                              └─► QuarantineSink
//! ```
//!
//! # Key Features
//!
//! - **Recovery chain**: fences, doubled braces, preamble, Python literals,
//!   single quotes and trailing commas are all tolerated
//! - **Never fails**: a batch always yields one row per input thread
//! - **Bounded concurrency**: at most `max_concurrency` service calls in flight
//! - **Quarantine**: undecodable replies are kept verbatim for later review
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use threadsift_domain::Thread;
//! use threadsift_extractor::{Extractor, ExtractorConfig, FileQuarantine};
//! use threadsift_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractorConfig::default();
//! let sink = Arc::new(FileQuarantine::open(&config.quarantine_path)?);
//! let extractor = Extractor::new(MockProvider::default(), config);
//!
//! let threads = vec![Thread::new("1a2b", "Start menu is slow")];
//! let result = extractor.run_batch(&threads, sink).await;
//!
//! for row in &result.rows {
//!     println!("{}: {}", row.id, row.post_type);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod extractor;
mod literal;
mod metrics;
mod parser;
mod prompt;
mod quarantine;
mod types;

#[cfg(test)]
mod tests;

pub use config::{ExtractorConfig, DEFAULT_QUARANTINE_PATH};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use literal::decode_literal;
pub use metrics::BatchMetrics;
pub use parser::{
    decode_permissive, decode_strict, isolate_object, map_fields, map_resolved, normalize,
    normalize_literals, normalize_quotes, parse_feedback, strip_code_fence, unwrap_double_braces,
    RecoveryChain,
};
pub use prompt::PromptBuilder;
pub use quarantine::{FileQuarantine, MemoryQuarantine};
pub use types::{
    BatchResult, DecodeFailure, DecodeStage, ExtractionFailure, ParseOutcome, ThreadOutcome,
};
