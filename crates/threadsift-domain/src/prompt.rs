//! Extraction prompt value object

use serde::{Deserialize, Serialize};

/// The composed instruction and thread content sent to a generative service
///
/// A value object with no identity: two prompts built from the same thread
/// are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPrompt {
    /// System instruction describing the expected record schema
    pub system: String,

    /// User message carrying the thread content
    pub user: String,
}

impl ExtractionPrompt {
    /// Create a prompt from its two parts
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Total length in bytes
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    /// Whether both parts are empty
    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}
