//! Pipeline output rows

use crate::{FeedbackType, ParsedFeedback, Resolution, Sentiment, Severity, Thread, TopicId};
use serde::{Deserialize, Serialize};

/// One output row per thread
///
/// Columns follow the tabular contract consumed by export, report and
/// visualization collaborators: the thread's source fields, the combined
/// prompt text, the raw service reply and the parsed record's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRow {
    /// Thread identifier
    pub id: String,
    /// Thread title
    pub title: String,
    /// Thread body
    #[serde(default)]
    pub selftext: String,
    /// Reply comments
    #[serde(default)]
    pub comments: Vec<String>,
    /// Score at fetch time
    #[serde(default)]
    pub upvotes: i64,
    /// Creation time, seconds since the Unix epoch
    #[serde(default)]
    pub created_utc: u64,
    /// Thread content as sent to the service
    #[serde(default)]
    pub combined: String,
    /// Raw service reply; absent when the service call failed
    #[serde(default)]
    pub feedback: Option<String>,
    /// Parsed `content`
    #[serde(default)]
    pub post_content: String,
    /// Parsed `type`
    #[serde(default)]
    pub post_type: FeedbackType,
    /// Parsed `build`
    #[serde(default)]
    pub build: Option<String>,
    /// Parsed `version`
    #[serde(default)]
    pub version: Option<String>,
    /// Parsed `sentiment`
    #[serde(default)]
    pub sentiment: Sentiment,
    /// Parsed `severity`
    #[serde(default)]
    pub severity: Severity,
    /// Parsed `resolved`
    #[serde(default)]
    pub resolved: Resolution,
    /// Parsed `resolve_text`
    #[serde(default)]
    pub resolution_text: Option<String>,
    /// Topic cluster, when clustering ran before extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_cluster: Option<TopicId>,
}

impl FeedbackRow {
    /// Assemble a row from a thread, its combined text, the raw reply and
    /// the parsed record
    pub fn new(
        thread: &Thread,
        combined: String,
        feedback: Option<String>,
        parsed: ParsedFeedback,
    ) -> Self {
        Self {
            id: thread.id.clone(),
            title: thread.title.clone(),
            selftext: thread.body_text().to_string(),
            comments: thread.comment_list().to_vec(),
            upvotes: thread.score,
            created_utc: thread.created_utc,
            combined,
            feedback,
            post_content: parsed.content,
            post_type: parsed.feedback_type,
            build: parsed.build,
            version: parsed.version,
            sentiment: parsed.sentiment,
            severity: parsed.severity,
            resolved: parsed.resolved,
            resolution_text: parsed.resolution_text,
            topic_cluster: thread.topic.clone(),
        }
    }

    /// The parsed record carried by this row
    pub fn parsed(&self) -> ParsedFeedback {
        ParsedFeedback {
            content: self.post_content.clone(),
            feedback_type: self.post_type,
            build: self.build.clone(),
            version: self.version.clone(),
            sentiment: self.sentiment,
            severity: self.severity,
            resolved: self.resolved.clone(),
            resolution_text: self.resolution_text.clone(),
        }
    }

    /// Rebuild the source thread this row was produced from
    pub fn thread(&self) -> Thread {
        Thread {
            id: self.id.clone(),
            title: self.title.clone(),
            body: Some(self.selftext.clone()),
            comments: Some(self.comments.clone()),
            score: self.upvotes,
            created_utc: self.created_utc,
            topic: self.topic_cluster.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_carries_parsed_fields() {
        let thread = Thread::new("t1", "Wi-Fi drops").with_score(12).with_topic(1u32);
        let parsed = ParsedFeedback {
            content: "Wi-Fi drops after sleep".to_string(),
            feedback_type: FeedbackType::Complaint,
            severity: Severity::High,
            resolved: Resolution::Unresolved,
            ..ParsedFeedback::default()
        };

        let row = FeedbackRow::new(&thread, "combined".to_string(), Some("{}".to_string()), parsed.clone());
        assert_eq!(row.upvotes, 12);
        assert_eq!(row.post_type, FeedbackType::Complaint);
        assert_eq!(row.parsed(), parsed);
        assert_eq!(row.thread().topic, Some(TopicId::from(1u32)));
    }

    #[test]
    fn test_row_column_names() {
        let row = FeedbackRow::new(&Thread::new("t", "x"), String::new(), None, ParsedFeedback::default());
        let json = serde_json::to_value(&row).unwrap();
        let obj = json.as_object().unwrap();
        for column in [
            "id", "title", "selftext", "comments", "upvotes", "created_utc", "combined",
            "feedback", "post_content", "post_type", "build", "version", "sentiment",
            "severity", "resolved", "resolution_text",
        ] {
            assert!(obj.contains_key(column), "missing column {}", column);
        }
        assert!(!obj.contains_key("topic_cluster"));
    }
}
