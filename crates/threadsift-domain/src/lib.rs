//! Threadsift Domain Layer
//!
//! Shared data model for the feedback extraction pipeline. Every other crate
//! depends on these types; this crate performs no I/O.
//!
//! ## Key Concepts
//!
//! - **Thread**: A source post with its title, body, bounded comment set and
//!   the topic cluster assigned by an external clustering step
//! - **ExtractionPrompt**: The instruction and thread content sent to a
//!   generative text service
//! - **ParsedFeedback**: The typed record recovered from the service's reply.
//!   Every field has an `unknown`/empty default, so a record always exists
//!   even when parsing failed
//! - **FeedbackItem**: One line of free-text feedback, used for graph display
//! - **FeedbackRow**: One output row per thread, the tabular contract consumed
//!   by export and visualization collaborators
//!
//! ## Boundaries
//!
//! - [`traits::LlmProvider`] is implemented by `threadsift-llm`
//! - [`traits::QuarantineSink`] is implemented by `threadsift-extractor`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod feedback;
pub mod prompt;
pub mod row;
pub mod run;
pub mod thread;
pub mod traits;

// Re-exports for convenience
pub use feedback::{
    truncate_chars, FeedbackItem, FeedbackType, ParsedFeedback, Resolution, Sentiment, Severity,
};
pub use prompt::ExtractionPrompt;
pub use row::FeedbackRow;
pub use run::RunId;
pub use thread::{Thread, TopicId};
pub use traits::{LlmProvider, QuarantineSink, QUARANTINE_SEPARATOR};
