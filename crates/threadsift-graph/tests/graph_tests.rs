//! Graph building over whole batches

use proptest::prelude::*;
use threadsift_domain::{FeedbackRow, ParsedFeedback, Thread, TopicId};
use threadsift_graph::{FeedbackGraph, FeedbackGraphBuilder, GraphConfig, NodeKey};

fn batch() -> Vec<(Thread, &'static str)> {
    vec![
        (
            Thread::new("a1", "Taskbar disappears after the latest cumulative update").with_topic(1u32),
            "- taskbar missing\n- explorer restarts",
        ),
        (
            Thread::new("a2", "Taskbar icons vanish").with_topic(1u32),
            "- taskbar missing",
        ),
        (
            Thread::new("b1", "Add tabs to Paint").with_topic(2u32),
            "* tabs in Paint",
        ),
    ]
}

fn build(batch: &[(Thread, &str)]) -> FeedbackGraph {
    FeedbackGraph::build(
        batch.iter().map(|(t, fb)| (t, Some(*fb))),
        GraphConfig::default(),
    )
}

#[test]
fn test_shared_topic_yields_one_node_and_two_edges() {
    let graph = build(&batch());

    let topic = NodeKey::topic(&TopicId::from(1u32));
    assert_eq!(graph.topics().count(), 2);
    let posts: Vec<&str> = graph.children(&topic).map(NodeKey::as_str).collect();
    assert_eq!(posts, vec!["post:a1", "post:a2"]);
}

#[test]
fn test_shared_feedback_collapses_across_threads() {
    let graph = build(&batch());

    let shared = NodeKey::feedback("taskbar missing");
    let parents = graph.edges().filter(|(_, to)| **to == shared).count();
    assert_eq!(parents, 2);
    assert_eq!(graph.feedback().count(), 3);
    assert!(graph.collisions().is_empty());
}

#[test]
fn test_counts() {
    let graph = build(&batch());

    // 2 topics + 3 posts + 3 feedback
    assert_eq!(graph.node_count(), 8);
    // 3 topic→post + 4 post→feedback
    assert_eq!(graph.edge_count(), 7);
}

#[test]
fn test_long_title_is_truncated_on_post_label() {
    let graph = build(&batch());
    let label = graph.get(&NodeKey::post("a1")).map(|n| n.label());
    assert_eq!(
        label.as_deref(),
        Some("Taskbar disappears after the latest cumu...")
    );
}

#[test]
fn test_distinct_truncated_keys_stay_distinct() {
    let t = Thread::new("x", "t").with_topic(9u32);
    let text = "- The start menu search is slow today\n- The start menu crashes on open";
    let graph = FeedbackGraph::build([(&t, Some(text))], GraphConfig::default());

    assert_eq!(graph.feedback().count(), 2);
    assert!(graph.collisions().is_empty());
}

#[test]
fn test_rows_use_parsed_content() {
    let thread = Thread::new("r1", "Row thread").with_topic(4u32);
    let parsed = ParsedFeedback {
        content: "- first point\n- second point".to_string(),
        ..ParsedFeedback::default()
    };
    let row = FeedbackRow::new(&thread, String::new(), Some("raw".to_string()), parsed);

    let graph = FeedbackGraph::from_rows(&[row], GraphConfig::default());

    assert_eq!(graph.feedback().count(), 2);
    assert!(graph.contains(&NodeKey::feedback("first point")));
    assert!(!graph.contains(&NodeKey::feedback("raw")));
}

#[test]
fn test_builder_is_chainable() {
    let (a, b) = (
        Thread::new("c1", "one").with_topic("ui"),
        Thread::new("c2", "two").with_topic("ui"),
    );
    let mut builder = FeedbackGraphBuilder::new(GraphConfig::default());
    builder.add_thread(&a, Some("x")).add_thread(&b, Some("y"));
    let graph = builder.build();

    assert_eq!(graph.topics().count(), 1);
    assert_eq!(graph.node_count(), 5);
}

#[test]
fn test_empty_batch() {
    let graph = build(&[]);
    assert!(graph.is_empty());
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.to_force_graph().nodes.is_empty());
}

proptest! {
    /// Property: building is deterministic and idempotent over repeated input
    #[test]
    fn test_deterministic_and_idempotent(
        items in prop::collection::vec(("[a-c]{1,3}", 0u32..3, "[a-z \n-]{0,40}"), 0..8)
    ) {
        let threads: Vec<(Thread, String)> = items
            .iter()
            .map(|(id, topic, fb)| (Thread::new(id.clone(), "title").with_topic(*topic), fb.clone()))
            .collect();
        let once = FeedbackGraph::build(
            threads.iter().map(|(t, fb)| (t, Some(fb.as_str()))),
            GraphConfig::default(),
        );
        let again = FeedbackGraph::build(
            threads.iter().map(|(t, fb)| (t, Some(fb.as_str()))),
            GraphConfig::default(),
        );
        let twice = FeedbackGraph::build(
            threads.iter().chain(threads.iter()).map(|(t, fb)| (t, Some(fb.as_str()))),
            GraphConfig::default(),
        );

        prop_assert_eq!(&once, &again);
        prop_assert_eq!(once.node_count(), twice.node_count());
        prop_assert_eq!(once.edge_count(), twice.edge_count());
    }
}
