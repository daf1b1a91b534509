//! Feedback module - the typed record recovered from a service reply

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Kind of feedback a thread expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    /// Something is broken or annoying
    Complaint,

    /// A request for new behavior
    FeatureRequest,

    /// A general opinion
    Opinion,

    /// Absent or unrecognized
    #[default]
    Unknown,
}

impl FeedbackType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Complaint => "complaint",
            FeedbackType::FeatureRequest => "feature_request",
            FeedbackType::Opinion => "opinion",
            FeedbackType::Unknown => "unknown",
        }
    }

    /// Parse a label as emitted by a generative service
    ///
    /// Accepts `feature request`, `feature-request` and `feature_request`
    /// in any case; anything unrecognized is `Unknown`.
    pub fn parse(label: &str) -> Self {
        match normalize_label(label).as_str() {
            "complaint" => FeedbackType::Complaint,
            "feature_request" => FeedbackType::FeatureRequest,
            "opinion" => FeedbackType::Opinion,
            _ => FeedbackType::Unknown,
        }
    }
}

/// Overall sentiment of the feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Favourable
    Positive,
    /// Unfavourable
    Negative,
    /// Neither
    Neutral,
    /// Absent or unrecognized
    #[default]
    Unknown,
}

impl Sentiment {
    /// Get the sentiment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Unknown => "unknown",
        }
    }

    /// Parse a label, falling back to `Unknown`
    pub fn parse(label: &str) -> Self {
        match normalize_label(label).as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            "neutral" => Sentiment::Neutral,
            _ => Sentiment::Unknown,
        }
    }
}

/// How severe the reported problem is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Minor
    Low,
    /// Noticeable
    Medium,
    /// Blocking
    High,
    /// Absent or unrecognized
    #[default]
    Unknown,
}

impl Severity {
    /// Get the severity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Unknown => "unknown",
        }
    }

    /// Parse a label, falling back to `Unknown`
    pub fn parse(label: &str) -> Self {
        match normalize_label(label).as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            _ => Severity::Unknown,
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(FeedbackType, Sentiment, Severity);

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

/// Tri-state resolution flag
///
/// Unrecognized values are kept as `Unknown(Some(original))` rather than
/// coerced, so a reader can still see what the service actually said.
/// Serializes as `true`, `false`, `null` or the original string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// The comments indicate the issue was resolved
    Resolved,

    /// The comments indicate the issue is still open
    Unresolved,

    /// Absent (`None`) or unrecognized (`Some(original)`)
    Unknown(Option<String>),
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Unknown(None)
    }
}

impl Resolution {
    /// Map a textual flag: `true/yes/1` and `false/no/0`, case-insensitive
    pub fn from_text(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Resolution::Resolved,
            "false" | "no" | "0" => Resolution::Unresolved,
            _ => Resolution::Unknown(Some(text.to_string())),
        }
    }

    /// Map a boolean flag
    pub fn from_bool(flag: bool) -> Self {
        if flag {
            Resolution::Resolved
        } else {
            Resolution::Unresolved
        }
    }

    /// The flag as a boolean, `None` when unknown
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Resolution::Resolved => Some(true),
            Resolution::Unresolved => Some(false),
            Resolution::Unknown(_) => None,
        }
    }

    /// Whether the flag is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, Resolution::Unknown(_))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Resolved => f.write_str("true"),
            Resolution::Unresolved => f.write_str("false"),
            Resolution::Unknown(Some(raw)) => f.write_str(raw),
            Resolution::Unknown(None) => Ok(()),
        }
    }
}

impl Serialize for Resolution {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Resolution::Resolved => serializer.serialize_bool(true),
            Resolution::Unresolved => serializer.serialize_bool(false),
            Resolution::Unknown(Some(raw)) => serializer.serialize_str(raw),
            Resolution::Unknown(None) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawFlag {
            Flag(bool),
            Text(String),
        }

        Ok(match Option::<RawFlag>::deserialize(deserializer)? {
            Some(RawFlag::Flag(flag)) => Resolution::from_bool(flag),
            Some(RawFlag::Text(text)) => Resolution::from_text(&text),
            None => Resolution::Unknown(None),
        })
    }
}

/// Structured feedback distilled from one thread
///
/// `Default` is the all-unknown record used when a reply is absent or cannot
/// be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedFeedback {
    /// The feedback text itself
    #[serde(default)]
    pub content: String,

    /// Complaint, feature request or opinion
    #[serde(default)]
    pub feedback_type: FeedbackType,

    /// Product build number, when mentioned
    #[serde(default)]
    pub build: Option<String>,

    /// Product version, when mentioned
    #[serde(default)]
    pub version: Option<String>,

    /// Overall sentiment
    #[serde(default)]
    pub sentiment: Sentiment,

    /// Severity of the reported problem
    #[serde(default)]
    pub severity: Severity,

    /// Whether the comments resolve the issue
    #[serde(default)]
    pub resolved: Resolution,

    /// How it was resolved, when it was
    #[serde(default)]
    pub resolution_text: Option<String>,
}

impl ParsedFeedback {
    /// A record holding only raw content, every other field unknown
    pub fn raw_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Whether no field beyond `content` carries information
    pub fn is_unclassified(&self) -> bool {
        self.feedback_type == FeedbackType::Unknown
            && self.build.is_none()
            && self.version.is_none()
            && self.sentiment == Sentiment::Unknown
            && self.severity == Severity::Unknown
            && self.resolved.is_unknown()
            && self.resolution_text.is_none()
    }
}

/// A single trimmed line of free-text feedback
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackItem {
    text: String,
}

impl FeedbackItem {
    /// Create an item from already-trimmed text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The full item text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text truncated to at most `max_chars` characters, used as an
    /// identity key for display
    pub fn display_key(&self, max_chars: usize) -> &str {
        truncate_chars(&self.text, max_chars)
    }
}

impl fmt::Display for FeedbackItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Truncate a string to at most `max_chars` characters at a char boundary
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: truncation never exceeds the limit and is always a prefix
        #[test]
        fn test_truncate_is_bounded_prefix(s in "\\PC*", n in 0usize..64) {
            let t = truncate_chars(&s, n);
            prop_assert!(t.chars().count() <= n);
            prop_assert!(s.starts_with(t));
        }

        /// Property: booleans survive the text mapping
        #[test]
        fn test_resolution_bool_roundtrip(flag: bool) {
            let r = Resolution::from_bool(flag);
            prop_assert_eq!(r.as_bool(), Some(flag));
            prop_assert_eq!(Resolution::from_text(&flag.to_string()), r);
        }
    }
}
