//! Threadsift Graph
//!
//! Links topic clusters to the threads in them and threads to the feedback
//! fragments extracted from them.
//!
//! ```text
//! topic:<cluster> ──► post:<thread id> ──► fb:<first 30 chars of item>
//! ```
//!
//! Feedback text is split into items by [`segment_feedback`]. Nodes are
//! identified by key, so a topic shared by many threads, or a fragment
//! repeated across threads, becomes a single node.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod graph;
mod segment;

pub use graph::{
    FeedbackGraph, FeedbackGraphBuilder, ForceGraph, ForceLink, ForceNode, GraphConfig,
    KeyCollision, Node, NodeKey, NodeKind,
};
pub use segment::segment_feedback;
