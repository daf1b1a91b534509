//! Topic → post → feedback graph
//!
//! Nodes live in a map keyed by identity and edges in an adjacency map, so
//! inserting the same node or edge twice is a no-op. Both maps are ordered,
//! which makes the built graph (and its JSON) independent of hash seeds.

use crate::segment::segment_feedback;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use threadsift_domain::{truncate_chars, FeedbackRow, Thread, TopicId};
use tracing::{debug, warn};

/// Marker appended to truncated post labels
const ELLIPSIS: &str = "...";

/// Truncation limits used while building the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum characters of a thread title shown on its post node
    pub post_label_len: usize,

    /// Characters of feedback text that form a feedback node's identity
    pub feedback_key_len: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            post_label_len: 40,
            feedback_key_len: 30,
        }
    }
}

impl GraphConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.post_label_len == 0 {
            return Err("post_label_len must be greater than 0".to_string());
        }
        if self.feedback_key_len == 0 {
            return Err("feedback_key_len must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Identity of a graph node: `topic:<id>`, `post:<id>` or `fb:<prefix>`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    /// Key of a topic cluster node
    pub fn topic(topic: &TopicId) -> Self {
        Self(format!("topic:{}", topic))
    }

    /// Key of a post node
    pub fn post(thread_id: &str) -> Self {
        Self(format!("post:{}", thread_id))
    }

    /// Key of a feedback node; `prefix` is already truncated
    pub fn feedback(prefix: &str) -> Self {
        Self(format!("fb:{}", prefix))
    }

    /// The key as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Node variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Topic cluster
    Topic,
    /// Source thread
    Post,
    /// Feedback fragment
    Feedback,
}

impl NodeKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Topic => "topic",
            NodeKind::Post => "post",
            NodeKind::Feedback => "feedback",
        }
    }
}

/// A graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// A topic cluster
    Topic {
        /// Cluster label
        id: TopicId,
    },

    /// A source thread
    Post {
        /// Thread identifier
        id: String,
        /// Title, truncated for display
        label: String,
    },

    /// A feedback fragment
    Feedback {
        /// Full text of the first fragment inserted under this key
        text: String,
    },
}

impl Node {
    /// The node's variant
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Topic { .. } => NodeKind::Topic,
            Node::Post { .. } => NodeKind::Post,
            Node::Feedback { .. } => NodeKind::Feedback,
        }
    }

    /// Display label
    pub fn label(&self) -> String {
        match self {
            Node::Topic { id } => format!("Topic {}", id),
            Node::Post { label, .. } => label.clone(),
            Node::Feedback { text } => text.clone(),
        }
    }
}

/// Two different feedback texts that share a truncated identity key
///
/// The first text owns the node; later ones are merged into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCollision {
    /// The shared key
    pub key: NodeKey,
    /// Text of the node that was kept
    pub kept: String,
    /// Text that was merged into it
    pub merged: String,
}

/// Topic → post → feedback graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackGraph {
    nodes: BTreeMap<NodeKey, Node>,
    #[serde(rename = "edges")]
    adjacency: BTreeMap<NodeKey, BTreeSet<NodeKey>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    collisions: Vec<KeyCollision>,
}

impl FeedbackGraph {
    /// Build a graph from `(thread, feedback text)` pairs
    pub fn build<'a, I>(batch: I, config: GraphConfig) -> Self
    where
        I: IntoIterator<Item = (&'a Thread, Option<&'a str>)>,
    {
        let mut builder = FeedbackGraphBuilder::new(config);
        for (thread, feedback) in batch {
            builder.add_thread(thread, feedback);
        }
        builder.build()
    }

    /// Build a graph from extracted rows, segmenting each row's parsed content
    pub fn from_rows(rows: &[FeedbackRow], config: GraphConfig) -> Self {
        let mut builder = FeedbackGraphBuilder::new(config);
        for row in rows {
            builder.add_row(row);
        }
        builder.build()
    }

    /// All nodes, ordered by key
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeKey, &Node)> {
        self.nodes.iter()
    }

    /// All edges as `(from, to)`, ordered
    pub fn edges(&self) -> impl Iterator<Item = (&NodeKey, &NodeKey)> {
        self.adjacency
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    /// Direct successors of `key`
    pub fn children(&self, key: &NodeKey) -> impl Iterator<Item = &NodeKey> {
        self.adjacency.get(key).into_iter().flatten()
    }

    /// Look up a node
    pub fn get(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Whether a node with `key` exists
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn of_kind(&self, kind: NodeKind) -> impl Iterator<Item = (&NodeKey, &Node)> {
        self.nodes.iter().filter(move |(_, node)| node.kind() == kind)
    }

    /// Topic nodes
    pub fn topics(&self) -> impl Iterator<Item = (&NodeKey, &Node)> {
        self.of_kind(NodeKind::Topic)
    }

    /// Post nodes
    pub fn posts(&self) -> impl Iterator<Item = (&NodeKey, &Node)> {
        self.of_kind(NodeKind::Post)
    }

    /// Feedback nodes
    pub fn feedback(&self) -> impl Iterator<Item = (&NodeKey, &Node)> {
        self.of_kind(NodeKind::Feedback)
    }

    /// Feedback texts merged into a node holding different text
    pub fn collisions(&self) -> &[KeyCollision] {
        &self.collisions
    }

    /// Flatten into the nodes/links shape force-directed layouts consume
    pub fn to_force_graph(&self) -> ForceGraph {
        ForceGraph {
            nodes: self
                .nodes
                .iter()
                .map(|(key, node)| ForceNode {
                    id: key.to_string(),
                    label: node.label(),
                    kind: node.kind(),
                })
                .collect(),
            links: self
                .edges()
                .map(|(from, to)| ForceLink {
                    source: from.to_string(),
                    target: to.to_string(),
                })
                .collect(),
        }
    }

    fn insert_node(&mut self, key: NodeKey, node: Node) {
        match self.nodes.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(node);
            }
            Entry::Occupied(entry) => {
                if let (Node::Feedback { text: kept }, Node::Feedback { text: merged }) =
                    (entry.get(), &node)
                {
                    if kept != merged {
                        warn!(key = %entry.key(), "distinct feedback texts share a node key");
                        self.collisions.push(KeyCollision {
                            key: entry.key().clone(),
                            kept: kept.clone(),
                            merged: merged.clone(),
                        });
                    }
                }
            }
        }
    }

    fn insert_edge(&mut self, from: &NodeKey, to: &NodeKey) {
        self.adjacency
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
    }
}

/// Single-pass reduction of a batch into a [`FeedbackGraph`]
pub struct FeedbackGraphBuilder {
    config: GraphConfig,
    graph: FeedbackGraph,
}

impl FeedbackGraphBuilder {
    /// Create an empty builder
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            graph: FeedbackGraph::default(),
        }
    }

    /// Add one thread and the feedback text extracted from it
    pub fn add_thread(&mut self, thread: &Thread, feedback: Option<&str>) -> &mut Self {
        let post_key = NodeKey::post(&thread.id);
        let post = Node::Post {
            id: thread.id.clone(),
            label: self.post_label(&thread.title),
        };
        self.graph.insert_node(post_key.clone(), post);

        match &thread.topic {
            Some(topic) => {
                let topic_key = NodeKey::topic(topic);
                self.graph
                    .insert_node(topic_key.clone(), Node::Topic { id: topic.clone() });
                self.graph.insert_edge(&topic_key, &post_key);
            }
            None => warn!(thread_id = %thread.id, "thread has no topic cluster"),
        }

        for item in segment_feedback(feedback) {
            let fb_key = NodeKey::feedback(item.display_key(self.config.feedback_key_len));
            self.graph.insert_node(
                fb_key.clone(),
                Node::Feedback {
                    text: item.text().to_string(),
                },
            );
            self.graph.insert_edge(&post_key, &fb_key);
        }

        self
    }

    /// Add an extracted row, using its parsed content as the feedback text
    pub fn add_row(&mut self, row: &FeedbackRow) -> &mut Self {
        self.add_thread(&row.thread(), Some(&row.post_content))
    }

    /// Finish building
    pub fn build(self) -> FeedbackGraph {
        debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            collisions = self.graph.collisions.len(),
            "built feedback graph"
        );
        self.graph
    }

    fn post_label(&self, title: &str) -> String {
        let limit = self.config.post_label_len;
        let truncated = truncate_chars(title, limit);
        if truncated.len() < title.len() {
            format!("{}{}", truncated, ELLIPSIS)
        } else {
            title.to_string()
        }
    }
}

/// Node/link view of a graph for force-directed rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceGraph {
    /// Nodes
    pub nodes: Vec<ForceNode>,
    /// Links
    pub links: Vec<ForceLink>,
}

/// One node in a [`ForceGraph`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceNode {
    /// Node key
    pub id: String,
    /// Display label
    pub label: String,
    /// Variant tag
    pub kind: NodeKind,
}

/// One link in a [`ForceGraph`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceLink {
    /// Key of the source node
    pub source: String,
    /// Key of the target node
    pub target: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(id: &str, title: &str, topic: u32) -> Thread {
        Thread::new(id, title).with_topic(topic)
    }

    #[test]
    fn test_node_keys() {
        assert_eq!(NodeKey::topic(&TopicId::from(3)).as_str(), "topic:3");
        assert_eq!(NodeKey::post("abc").as_str(), "post:abc");
        assert_eq!(NodeKey::feedback("slow boot").as_str(), "fb:slow boot");
    }

    #[test]
    fn test_post_label_truncation() {
        let builder = FeedbackGraphBuilder::new(GraphConfig::default());
        let long = "a".repeat(45);
        assert_eq!(builder.post_label(&long), format!("{}...", "a".repeat(40)));
        assert_eq!(builder.post_label(&"b".repeat(40)), "b".repeat(40));
        assert_eq!(builder.post_label("short"), "short");
    }

    #[test]
    fn test_post_label_counts_chars_not_bytes() {
        let builder = FeedbackGraphBuilder::new(GraphConfig::default());
        let title = "é".repeat(40);
        assert_eq!(builder.post_label(&title), title);
    }

    #[test]
    fn test_single_thread() {
        let t = thread("p1", "Start menu lag", 2);
        let graph = FeedbackGraph::build([(&t, Some("- slow search\n- high CPU"))], GraphConfig::default());

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        let post = NodeKey::post("p1");
        let children: Vec<&str> = graph.children(&post).map(NodeKey::as_str).collect();
        assert_eq!(children, vec!["fb:high CPU", "fb:slow search"]);
        assert_eq!(
            graph.children(&NodeKey::topic(&TopicId::from(2))).count(),
            1
        );
    }

    #[test]
    fn test_thread_without_topic_has_no_topic_edge() {
        let t = Thread::new("p1", "Orphan");
        let graph = FeedbackGraph::build([(&t, Some("item"))], GraphConfig::default());

        assert_eq!(graph.topics().count(), 0);
        assert_eq!(graph.posts().count(), 1);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_absent_feedback_adds_no_feedback_nodes() {
        let t = thread("p1", "Nothing", 1);
        let graph = FeedbackGraph::build([(&t, None)], GraphConfig::default());

        assert_eq!(graph.feedback().count(), 0);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_first_text_wins_and_collision_is_recorded() {
        let prefix = "x".repeat(30);
        let t = thread("p1", "t", 1);
        let text = format!("- {}AAA\n- {}BBB", prefix, prefix);
        let graph = FeedbackGraph::build([(&t, Some(text.as_str()))], GraphConfig::default());

        let key = NodeKey::feedback(&prefix);
        assert_eq!(graph.feedback().count(), 1);
        assert_eq!(graph.get(&key).map(Node::label), Some(format!("{}AAA", prefix)));
        assert_eq!(graph.collisions().len(), 1);
        assert_eq!(graph.collisions()[0].merged, format!("{}BBB", prefix));
    }

    #[test]
    fn test_identical_text_is_not_a_collision() {
        let t = thread("p1", "t", 1);
        let graph = FeedbackGraph::build([(&t, Some("- same\n- same"))], GraphConfig::default());

        assert_eq!(graph.feedback().count(), 1);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.collisions().is_empty());
    }

    #[test]
    fn test_force_graph_view() {
        let t = thread("p1", "Lag", 7);
        let graph = FeedbackGraph::build([(&t, Some("slow"))], GraphConfig::default());
        let view = graph.to_force_graph();

        assert_eq!(view.nodes.len(), 3);
        assert_eq!(view.links.len(), 2);
        let topic = view.nodes.iter().find(|n| n.kind == NodeKind::Topic).unwrap();
        assert_eq!(topic.id, "topic:7");
        assert_eq!(topic.label, "Topic 7");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["links"][0]["source"], "post:p1");
        assert_eq!(json["links"][0]["target"], "fb:slow");
    }

    #[test]
    fn test_graph_serializes() {
        let t = thread("p1", "Lag", 7);
        let graph = FeedbackGraph::build([(&t, Some("slow"))], GraphConfig::default());
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(json["nodes"]["post:p1"]["kind"], "post");
        assert_eq!(json["nodes"]["topic:7"]["id"], "7");
        assert_eq!(json["edges"]["topic:7"][0], "post:p1");
        assert!(json.get("collisions").is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(GraphConfig::default().validate().is_ok());
        let bad = GraphConfig {
            feedback_key_len: 0,
            ..GraphConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
