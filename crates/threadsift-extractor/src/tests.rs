//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{
        DecodeStage, Extractor, ExtractorConfig, FileQuarantine, MemoryQuarantine,
    };
    use std::sync::Arc;
    use threadsift_domain::{
        FeedbackType, ParsedFeedback, QuarantineSink, Resolution, Severity, Thread,
    };
    use threadsift_llm::MockProvider;

    fn batch_threads() -> Vec<Thread> {
        vec![
            Thread::new("t1", "Taskbar vanished").with_body("after KB5034765"),
            Thread::new("t2", "Add tabs to Notepad"),
            Thread::new("t3", "Explorer crash").with_comments(["same", "fixed by reboot"]),
            Thread::new("t4", "Service down"),
            Thread::new("t5", "Rambling"),
        ]
    }

    fn batch_provider() -> MockProvider {
        let mut llm = MockProvider::new("{}");
        llm.add_response(
            "title: Taskbar vanished",
            "```json\n{\"content\": \"Taskbar vanished\", \"type\": \"complaint\", \"severity\": \"high\", \"resolved\": False,}\n```",
        );
        llm.add_response(
            "title: Add tabs to Notepad",
            "{'content': 'Tabs please', 'type': 'feature request', 'resolved': 'no'}",
        );
        llm.add_response(
            "title: Explorer crash",
            "Sure! {\"content\": \"Explorer crash\", \"type\": \"complaint\", \"resolved\": true, \"resolve_text\": \"reboot\"}",
        );
        llm.add_error("title: Service down");
        llm.add_response("title: Rambling", "I could not find any feedback here.");
        llm
    }

    #[tokio::test]
    async fn test_batch_yields_one_row_per_thread_in_order() {
        let extractor = Extractor::new(batch_provider(), ExtractorConfig::default());
        let sink = Arc::new(MemoryQuarantine::new());
        let threads = batch_threads();

        let result = extractor.run_batch(&threads, sink.clone()).await;

        let ids: Vec<&str> = result.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3", "t4", "t5"]);
        assert_eq!(result.model_name, "mock");
    }

    #[tokio::test]
    async fn test_batch_mixed_replies() {
        let extractor = Extractor::new(batch_provider(), ExtractorConfig::default());
        let sink = Arc::new(MemoryQuarantine::new());

        let result = extractor.run_batch(&batch_threads(), sink.clone()).await;
        let rows = &result.rows;

        // Fenced reply with a Python boolean and a trailing comma
        assert_eq!(rows[0].post_type, FeedbackType::Complaint);
        assert_eq!(rows[0].severity, Severity::High);
        assert_eq!(rows[0].resolved, Resolution::Unresolved);

        // Single-quoted reply
        assert_eq!(rows[1].post_content, "Tabs please");
        assert_eq!(rows[1].post_type, FeedbackType::FeatureRequest);

        // Prose preamble
        assert_eq!(rows[2].resolved, Resolution::Resolved);
        assert_eq!(rows[2].resolution_text.as_deref(), Some("reboot"));

        // Service failure
        assert_eq!(rows[3].feedback, None);
        assert_eq!(rows[3].parsed(), ParsedFeedback::default());

        // Undecodable reply
        assert_eq!(rows[4].post_content, "I could not find any feedback here.");
        assert_eq!(rows[4].post_type, FeedbackType::Unknown);
        assert_eq!(
            sink.records(),
            vec!["I could not find any feedback here.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_batch_metrics_and_failures() {
        let extractor = Extractor::new(batch_provider(), ExtractorConfig::default());
        let sink = Arc::new(MemoryQuarantine::new());

        let result = extractor.run_batch(&batch_threads(), sink).await;
        let metrics = &result.metrics;

        assert_eq!(metrics.threads, 5);
        assert_eq!(metrics.strict, 2);
        assert_eq!(metrics.quote_normalized, 1);
        assert_eq!(metrics.quarantined, 1);
        assert_eq!(metrics.absent, 1);
        assert_eq!(metrics.service_failures, 1);

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].thread_id, "t4");
    }

    #[tokio::test]
    async fn test_serial_batch_matches_parallel_batch() {
        let threads = batch_threads();

        let serial = Extractor::new(batch_provider(), ExtractorConfig::lenient())
            .run_batch(&threads, Arc::new(MemoryQuarantine::new()))
            .await;
        let parallel = Extractor::new(batch_provider(), ExtractorConfig::aggressive())
            .run_batch(&threads, Arc::new(MemoryQuarantine::new()))
            .await;

        // The presets differ in comment limits, so compare parsed fields only
        let parsed = |rows: &[threadsift_domain::FeedbackRow]| {
            rows.iter().map(|r| (r.id.clone(), r.parsed())).collect::<Vec<_>>()
        };
        assert_eq!(parsed(&serial.rows), parsed(&parallel.rows));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let llm = MockProvider::default();
        let extractor = Extractor::new(llm.clone(), ExtractorConfig::default());

        let result = extractor
            .run_batch(&[], Arc::new(MemoryQuarantine::new()))
            .await;

        assert!(result.rows.is_empty());
        assert_eq!(result.metrics.threads, 0);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_each_thread_calls_the_service_once() {
        let llm = batch_provider();
        let extractor = Extractor::new(llm.clone(), ExtractorConfig::default());

        extractor
            .run_batch(&batch_threads(), Arc::new(MemoryQuarantine::new()))
            .await;

        assert_eq!(llm.call_count(), 5);
    }

    #[tokio::test]
    async fn test_batch_writes_quarantine_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad_feedback.txt");
        let sink: Arc<dyn QuarantineSink> = Arc::new(FileQuarantine::open(&path).unwrap());

        let extractor = Extractor::new(MockProvider::new("not json at all"), ExtractorConfig::default());
        let threads = vec![Thread::new("a", "one"), Thread::new("b", "two")];
        let result = extractor.run_batch(&threads, sink).await;

        assert_eq!(result.metrics.quarantined, 2);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "not json at all\n---\nnot json at all\n---\n");
    }

    #[test]
    fn test_process_thread_from_sync_context() {
        let extractor = Extractor::new(
            MockProvider::new(r#"{"content": "x", "type": "opinion"}"#),
            ExtractorConfig::default(),
        );
        let sink = Arc::new(MemoryQuarantine::new());
        let thread = Thread::new("s", "sync");

        let outcome = tokio_test::block_on(extractor.process_thread(&thread, sink));

        assert_eq!(outcome.stage, DecodeStage::Strict);
        assert_eq!(outcome.row.post_type, FeedbackType::Opinion);
    }
}
