//! Recover a typed feedback record from a service reply
//!
//! Generative services are asked for a single JSON object but routinely
//! answer with near-JSON: fenced code blocks, doubled braces copied from a
//! template, conversational preamble, Python-style booleans, single quotes
//! and trailing commas. The recovery chain applies one text transform per
//! deviation, then tries up to three decoders in order:
//!
//! ```text
//! raw ─► strip fence ─► unwrap {{ }} ─► isolate {…} ─► normalize literals
//!                                                          │
//!          ┌──────────── strict ◄──────────────────────────┘
//!          ├─ fail ─► quote-normalized
//!          │            ├─ fail ─► permissive literal
//!          │            │            └─ fail ─► quarantine raw, all-unknown record
//!          ▼            ▼            ▼
//!                   field mapping
//! ```
//!
//! Each transform is a pure function exposed on its own so it can be tested
//! in isolation. No stage ever returns an error to the caller.

use crate::literal::decode_literal;
use crate::types::{DecodeFailure, DecodeStage, ParseOutcome};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use threadsift_domain::{
    FeedbackType, ParsedFeedback, QuarantineSink, Resolution, Sentiment, Severity,
};
use tracing::{debug, warn};

static TRUE_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bTrue\b").expect("valid regex"));
static FALSE_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bFalse\b").expect("valid regex"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\}").expect("valid regex"));

/// Stage 1: remove a leading fence (with optional language tag) and a
/// trailing fence, then trim
pub fn strip_code_fence(text: &str) -> String {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim().to_string()
}

/// Stage 2: remove one layer of braces from text wrapped in `{{ … }}`
pub fn unwrap_double_braces(text: &str) -> String {
    let s = text.trim();
    if s.len() >= 4 && s.starts_with("{{") && s.ends_with("}}") {
        s[1..s.len() - 1].trim().to_string()
    } else {
        s.to_string()
    }
}

/// Stage 3: keep only the span from the first `{` to the last `}`
pub fn isolate_object(text: &str) -> String {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

/// Stage 4: lowercase bare `True`/`False` and drop a comma right before `}`
pub fn normalize_literals(text: &str) -> String {
    let s = TRUE_LITERAL.replace_all(text, "true");
    let s = FALSE_LITERAL.replace_all(&s, "false");
    TRAILING_COMMA.replace_all(&s, "}").into_owned()
}

/// Stage 6 transform: replace every single quote with a double quote
pub fn normalize_quotes(text: &str) -> String {
    text.replace('\'', "\"")
}

/// Run stages 1–4 in order
pub fn normalize(raw: &str) -> String {
    let stages: [(&str, fn(&str) -> String); 4] = [
        ("strip_code_fence", strip_code_fence),
        ("unwrap_double_braces", unwrap_double_braces),
        ("isolate_object", isolate_object),
        ("normalize_literals", normalize_literals),
    ];

    let mut text = raw.to_string();
    for (name, transform) in stages {
        let next = transform(&text);
        debug!(stage = name, changed = next != text, len = next.len(), "normalization stage");
        text = next;
    }
    text
}

fn expect_object(value: Value) -> Result<Map<String, Value>, String> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected an object, found {}", json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Stage 5: strict JSON decode into an object
pub fn decode_strict(text: &str) -> Result<Map<String, Value>, String> {
    serde_json::from_str::<Value>(text)
        .map_err(|e| e.to_string())
        .and_then(expect_object)
}

/// Stage 7: permissive literal decode into an object
pub fn decode_permissive(text: &str) -> Result<Map<String, Value>, String> {
    decode_literal(text).and_then(expect_object)
}

/// Render any JSON value as text; strings stay verbatim
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Optional text field: blank strings and null are absent
fn optional_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        other => Some(other.to_string()),
    }
}

fn label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Map the `resolved` flag
///
/// Booleans are taken as-is, strings go through `true/yes/1` and
/// `false/no/0`; anything else is unknown and keeps its original text.
pub fn map_resolved(value: Option<&Value>) -> Resolution {
    match value {
        None | Some(Value::Null) => Resolution::Unknown(None),
        Some(Value::Bool(flag)) => Resolution::from_bool(*flag),
        Some(Value::String(text)) => Resolution::from_text(text),
        Some(Value::Number(n)) => Resolution::from_text(&n.to_string()),
        Some(other) => Resolution::Unknown(Some(other.to_string())),
    }
}

/// Map a decoded object onto the typed record
pub fn map_fields(obj: &Map<String, Value>) -> ParsedFeedback {
    ParsedFeedback {
        content: obj.get("content").map(value_text).unwrap_or_default(),
        feedback_type: FeedbackType::parse(&label(obj.get("type"))),
        build: optional_text(obj.get("build")),
        version: optional_text(obj.get("version")),
        sentiment: Sentiment::parse(&label(obj.get("sentiment"))),
        severity: Severity::parse(&label(obj.get("severity"))),
        resolved: map_resolved(obj.get("resolved")),
        resolution_text: optional_text(obj.get("resolve_text")),
    }
}

const DECODE_ORDER: [DecodeStage; 3] = [
    DecodeStage::Strict,
    DecodeStage::QuoteNormalized,
    DecodeStage::PermissiveLiteral,
];

fn decode_at(stage: DecodeStage, normalized: &str) -> Result<Map<String, Value>, String> {
    match stage {
        DecodeStage::Strict => decode_strict(normalized),
        DecodeStage::QuoteNormalized => decode_strict(&normalize_quotes(normalized)),
        DecodeStage::PermissiveLiteral => decode_permissive(normalized),
        DecodeStage::Quarantined | DecodeStage::Absent => {
            Err(format!("{} is not a decode stage", stage))
        }
    }
}

/// The recovery chain, bound to the quarantine sink for one batch run
pub struct RecoveryChain<'a> {
    sink: &'a dyn QuarantineSink,
}

impl<'a> RecoveryChain<'a> {
    /// Create a chain that quarantines into `sink`
    pub fn new(sink: &'a dyn QuarantineSink) -> Self {
        Self { sink }
    }

    /// Parse a reply that may be absent
    ///
    /// An absent reply yields the all-unknown record without touching the
    /// quarantine sink.
    pub fn parse_reply(&self, raw: Option<&str>) -> ParseOutcome {
        match raw {
            Some(text) => self.parse(text),
            None => Self::absent(),
        }
    }

    /// The outcome for a thread that produced no reply
    pub fn absent() -> ParseOutcome {
        ParseOutcome {
            feedback: ParsedFeedback::default(),
            stage: DecodeStage::Absent,
            failures: Vec::new(),
            normalized: String::new(),
            quarantine_error: None,
        }
    }

    /// Parse a reply through every stage until one decodes
    pub fn parse(&self, raw: &str) -> ParseOutcome {
        let normalized = normalize(raw);
        let mut failures = Vec::new();

        for stage in DECODE_ORDER {
            match decode_at(stage, &normalized) {
                Ok(obj) => {
                    debug!(stage = %stage, "decoded reply");
                    return ParseOutcome {
                        feedback: map_fields(&obj),
                        stage,
                        failures,
                        normalized,
                        quarantine_error: None,
                    };
                }
                Err(error) => {
                    debug!(stage = %stage, error = %error, "decode attempt failed");
                    failures.push(DecodeFailure { stage, error });
                }
            }
        }

        warn!(len = raw.len(), "reply could not be decoded, quarantining");
        let quarantine_error = self.sink.record(raw).err().map(|e| {
            warn!(error = %e, "failed to write quarantine record");
            e.to_string()
        });

        ParseOutcome {
            feedback: ParsedFeedback::raw_content(raw),
            stage: DecodeStage::Quarantined,
            failures,
            normalized,
            quarantine_error,
        }
    }
}

/// Parse one reply into a record, quarantining it into `sink` if nothing
/// decodes
pub fn parse_feedback(raw: &str, sink: &dyn QuarantineSink) -> ParsedFeedback {
    RecoveryChain::new(sink).parse(raw).feedback
}
