//! Metrics collection for batch runs

use crate::types::DecodeStage;
use serde::Serialize;

/// Counters collected during one batch run
///
/// Tracks which recovery stage produced each record, plus service and
/// quarantine failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchMetrics {
    /// Threads processed
    pub threads: usize,

    /// Replies decoded by the strict decoder
    pub strict: usize,

    /// Replies decoded after quote normalization
    pub quote_normalized: usize,

    /// Replies decoded by the permissive literal decoder
    pub permissive_literal: usize,

    /// Replies no stage could decode
    pub quarantined: usize,

    /// Threads with no reply at all
    pub absent: usize,

    /// Service calls that failed or timed out
    pub service_failures: usize,

    /// Quarantine records the sink rejected
    pub quarantine_write_failures: usize,

    /// Wall-clock runtime in milliseconds
    pub runtime_ms: u64,
}

impl BatchMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record which stage handled a thread's reply
    pub fn record_stage(&mut self, stage: DecodeStage) {
        self.threads += 1;
        match stage {
            DecodeStage::Strict => self.strict += 1,
            DecodeStage::QuoteNormalized => self.quote_normalized += 1,
            DecodeStage::PermissiveLiteral => self.permissive_literal += 1,
            DecodeStage::Quarantined => self.quarantined += 1,
            DecodeStage::Absent => self.absent += 1,
        }
    }

    /// Record a failed or timed-out service call
    pub fn record_service_failure(&mut self) {
        self.service_failures += 1;
    }

    /// Record a quarantine write the sink rejected
    pub fn record_quarantine_write_failure(&mut self) {
        self.quarantine_write_failures += 1;
    }

    /// Replies recovered by any decode stage
    pub fn decoded(&self) -> usize {
        self.strict + self.quote_normalized + self.permissive_literal
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Batch Summary".to_string(),
            "=============".to_string(),
            format!("Threads: {}", self.threads),
            format!("Runtime: {}ms", self.runtime_ms),
            String::new(),
            "Decoded by stage:".to_string(),
            format!("  strict: {}", self.strict),
            format!("  quote_normalized: {}", self.quote_normalized),
            format!("  permissive_literal: {}", self.permissive_literal),
            format!("  Total: {}", self.decoded()),
            String::new(),
            format!("Quarantined: {}", self.quarantined),
            format!("No reply: {}", self.absent),
        ];

        if self.service_failures > 0 {
            lines.push(format!("Service failures: {}", self.service_failures));
        }
        if self.quarantine_write_failures > 0 {
            lines.push(format!(
                "Quarantine write failures: {}",
                self.quarantine_write_failures
            ));
        }

        lines.join("\n")
    }
}
