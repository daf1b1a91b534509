//! Parse outcomes and batch results

use crate::metrics::BatchMetrics;
use serde::Serialize;
use std::fmt;
use threadsift_domain::{FeedbackRow, ParsedFeedback, RunId};

/// The recovery-chain stage that produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStage {
    /// Strict JSON decode of the normalized text
    Strict,

    /// JSON decode after replacing single quotes with double quotes
    QuoteNormalized,

    /// Permissive literal decode
    PermissiveLiteral,

    /// Nothing decoded; the raw text was quarantined
    Quarantined,

    /// There was no reply to parse
    Absent,
}

impl DecodeStage {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeStage::Strict => "strict",
            DecodeStage::QuoteNormalized => "quote_normalized",
            DecodeStage::PermissiveLiteral => "permissive_literal",
            DecodeStage::Quarantined => "quarantined",
            DecodeStage::Absent => "absent",
        }
    }

    /// Whether a structured record was recovered
    pub fn is_decoded(&self) -> bool {
        matches!(
            self,
            DecodeStage::Strict | DecodeStage::QuoteNormalized | DecodeStage::PermissiveLiteral
        )
    }
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed decode attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeFailure {
    /// Stage that failed
    pub stage: DecodeStage,

    /// Decoder error message
    pub error: String,
}

/// Everything the recovery chain learned about one reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseOutcome {
    /// The recovered record; all-unknown when nothing decoded
    pub feedback: ParsedFeedback,

    /// Stage that produced `feedback`
    pub stage: DecodeStage,

    /// Decode attempts that failed before `stage`, in chain order
    pub failures: Vec<DecodeFailure>,

    /// Text after the normalization transforms, before decoding
    pub normalized: String,

    /// Set when the reply had to be quarantined and the sink rejected it
    pub quarantine_error: Option<String>,
}

/// A thread whose extraction did not complete normally
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionFailure {
    /// Thread identifier
    pub thread_id: String,

    /// Reason for failure
    pub reason: String,
}

/// Result of a batch run
///
/// `rows` always holds exactly one row per input thread, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Identifier of this run
    pub run_id: RunId,

    /// Name of the model that answered
    pub model_name: String,

    /// One output row per input thread
    pub rows: Vec<FeedbackRow>,

    /// Threads whose service call failed
    pub failures: Vec<ExtractionFailure>,

    /// Counters for the run
    pub metrics: BatchMetrics,
}

/// Everything produced for one thread
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadOutcome {
    /// The output row
    pub row: FeedbackRow,

    /// Stage that produced the row's parsed fields
    pub stage: DecodeStage,

    /// Set when the service call failed
    pub failure: Option<ExtractionFailure>,

    /// Set when a quarantine write was rejected
    pub quarantine_error: Option<String>,
}
