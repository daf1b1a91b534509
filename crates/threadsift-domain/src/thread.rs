//! Thread module - a source post and its discussion

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque topic-cluster label assigned by the external clustering step
///
/// Clustering collaborators usually emit integer labels, while hand-written
/// batches tend to use strings. Both deserialize into the same textual form,
/// so `3` and `"3"` name the same cluster.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    /// Create a topic id from any label
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Get the label as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for TopicId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for TopicId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TopicId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for TopicId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawLabel {
            Int(i64),
            Text(String),
        }

        Ok(match RawLabel::deserialize(deserializer)? {
            RawLabel::Int(n) => TopicId(n.to_string()),
            RawLabel::Text(s) => TopicId(s),
        })
    }
}

/// A source thread: one post plus its title, body and bounded comment set
///
/// Threads are immutable once fetched. The topic cluster is attached later by
/// an external step and is treated as read-only from then on. Missing body or
/// comment fields are tolerated and render as empty text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Source identifier
    pub id: String,

    /// Thread title
    #[serde(default)]
    pub title: String,

    /// Body text of the post
    #[serde(default, alias = "selftext")]
    pub body: Option<String>,

    /// Reply comments, in source order
    #[serde(default)]
    pub comments: Option<Vec<String>>,

    /// Score (upvotes) at fetch time
    #[serde(default, alias = "upvotes")]
    pub score: i64,

    /// Creation time, seconds since the Unix epoch
    #[serde(default)]
    pub created_utc: u64,

    /// Topic cluster assigned by the clustering collaborator
    #[serde(default, alias = "topic_cluster", skip_serializing_if = "Option::is_none")]
    pub topic: Option<TopicId>,
}

impl Thread {
    /// Create a thread with only an id and a title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: None,
            comments: None,
            score: 0,
            created_utc: 0,
            topic: None,
        }
    }

    /// Set the body text
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the comment list
    pub fn with_comments<I, S>(mut self, comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comments = Some(comments.into_iter().map(Into::into).collect());
        self
    }

    /// Set the score
    pub fn with_score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }

    /// Set the creation timestamp
    pub fn with_created_utc(mut self, created_utc: u64) -> Self {
        self.created_utc = created_utc;
        self
    }

    /// Attach a topic cluster
    pub fn with_topic(mut self, topic: impl Into<TopicId>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Body text, empty when absent
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    /// Comments, empty when absent
    pub fn comment_list(&self) -> &[String] {
        self.comments.as_deref().unwrap_or(&[])
    }
}
