//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde::Serialize;
use threadsift_domain::{truncate_chars, ExtractionPrompt, FeedbackRow};
use threadsift_extractor::{BatchResult, ParseOutcome};
use threadsift_graph::{FeedbackGraph, NodeKind};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Characters of parsed content shown per table row
const CONTENT_PREVIEW_LEN: usize = 60;

/// A batch and the graph built from it, emitted as one JSON document
#[derive(Serialize)]
struct RunReport<'a> {
    batch: &'a BatchResult,
    graph: &'a FeedbackGraph,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the result of a single parse.
    pub fn format_outcome(&self, outcome: &ParseOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(outcome),
            OutputFormat::Quiet => Ok(outcome.stage.to_string()),
            OutputFormat::Table => {
                let fb = &outcome.feedback;
                let resolved = fb.resolved.to_string();
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                builder.push_record(["stage", outcome.stage.as_str()]);
                builder.push_record(["content", fb.content.as_str()]);
                builder.push_record(["type", fb.feedback_type.as_str()]);
                builder.push_record(["build", fb.build.as_deref().unwrap_or("")]);
                builder.push_record(["version", fb.version.as_deref().unwrap_or("")]);
                builder.push_record(["sentiment", fb.sentiment.as_str()]);
                builder.push_record(["severity", fb.severity.as_str()]);
                builder.push_record(["resolved", resolved.as_str()]);
                builder.push_record([
                    "resolve_text",
                    fb.resolution_text.as_deref().unwrap_or(""),
                ]);

                let mut out = self.table(builder);
                for failure in &outcome.failures {
                    out.push('\n');
                    out.push_str(
                        &self.warning(&format!("{} failed: {}", failure.stage, failure.error)),
                    );
                }
                if let Some(error) = &outcome.quarantine_error {
                    out.push('\n');
                    out.push_str(&self.error(&format!("quarantine write failed: {}", error)));
                }
                Ok(out)
            }
        }
    }

    /// Format extracted rows.
    pub fn format_rows(&self, rows: &[FeedbackRow]) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(rows),
            OutputFormat::Quiet => Ok(rows
                .iter()
                .map(|r| format!("{}\t{}", r.id, r.post_type))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if rows.is_empty() {
                    return Ok(self.colorize("No rows.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record([
                    "ID", "Type", "Sentiment", "Severity", "Resolved", "Build", "Content",
                ]);
                for row in rows {
                    let content = preview(&row.post_content);
                    let resolved = row.resolved.to_string();
                    builder.push_record([
                        row.id.as_str(),
                        row.post_type.as_str(),
                        row.sentiment.as_str(),
                        row.severity.as_str(),
                        resolved.as_str(),
                        row.build.as_deref().unwrap_or(""),
                        content.as_str(),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format a batch result: rows plus a summary of the run.
    pub fn format_batch(&self, result: &BatchResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(result),
            OutputFormat::Quiet => self.format_rows(&result.rows),
            OutputFormat::Table => {
                let mut out = self.format_rows(&result.rows)?;
                out.push_str("\n\n");
                out.push_str(&result.metrics.summary());
                for failure in &result.failures {
                    out.push('\n');
                    out.push_str(&self.error(&format!("{}: {}", failure.thread_id, failure.reason)));
                }
                out.push('\n');
                out.push_str(&self.info(&format!(
                    "run {} with model {}",
                    result.run_id, result.model_name
                )));
                Ok(out)
            }
        }
    }

    /// Format a batch run, followed by its graph when one was built.
    pub fn format_run(&self, result: &BatchResult, graph: Option<&FeedbackGraph>) -> Result<String> {
        match (self.format, graph) {
            (_, None) => self.format_batch(result),
            (OutputFormat::Json, Some(graph)) => json(&RunReport {
                batch: result,
                graph,
            }),
            (_, Some(graph)) => Ok(format!(
                "{}\n{}",
                self.format_batch(result)?,
                self.format_graph(graph, false)?
            )),
        }
    }

    /// Format a feedback graph.
    pub fn format_graph(&self, graph: &FeedbackGraph, force: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json if force => json(&graph.to_force_graph()),
            OutputFormat::Json => json(graph),
            OutputFormat::Quiet => Ok(graph
                .edges()
                .map(|(from, to)| format!("{} -> {}", from, to))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Node", "Kind", "Label", "Children"]);
                for (key, node) in graph.nodes() {
                    let kind = node.kind();
                    builder.push_record([
                        key.to_string(),
                        self.colorize(kind.as_str(), kind_color(kind)),
                        preview(&node.label()),
                        graph.children(key).count().to_string(),
                    ]);
                }

                let mut out = self.table(builder);
                out.push('\n');
                out.push_str(&self.info(&format!(
                    "{} nodes, {} edges",
                    graph.node_count(),
                    graph.edge_count()
                )));
                for collision in graph.collisions() {
                    out.push('\n');
                    out.push_str(&self.warning(&format!(
                        "{} merged \"{}\" into \"{}\"",
                        collision.key, collision.merged, collision.kept
                    )));
                }
                Ok(out)
            }
        }
    }

    /// Format a composed prompt.
    pub fn format_prompt(&self, prompt: &ExtractionPrompt) -> Result<String> {
        match self.format {
            OutputFormat::Json => json(prompt),
            OutputFormat::Quiet => Ok(prompt.user.clone()),
            OutputFormat::Table => Ok(format!(
                "{}\n{}\n\n{}\n{}",
                self.colorize("system:", "cyan"),
                prompt.system,
                self.colorize("user:", "cyan"),
                prompt.user
            )),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn kind_color(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Topic => "cyan",
        NodeKind::Post => "green",
        NodeKind::Feedback => "magenta",
    }
}

/// Single-line preview of a possibly long, multi-line text
fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let cut = truncate_chars(&flat, CONTENT_PREVIEW_LEN);
    if cut.len() < flat.len() {
        format!("{}...", cut)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadsift_domain::{FeedbackType, ParsedFeedback, Thread};
    use threadsift_domain::RunId;
    use threadsift_extractor::{BatchMetrics, MemoryQuarantine, RecoveryChain};
    use threadsift_graph::GraphConfig;

    fn sample_row() -> FeedbackRow {
        let thread = Thread::new("r1", "Slow boot").with_topic(3u32);
        let parsed = ParsedFeedback {
            content: "Boot takes two minutes".to_string(),
            feedback_type: FeedbackType::Complaint,
            ..ParsedFeedback::default()
        };
        FeedbackRow::new(&thread, "combined".to_string(), Some("{}".to_string()), parsed)
    }

    #[test]
    fn test_rows_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_rows(&[sample_row()]).unwrap();
        assert!(output.contains("Severity"));
        assert!(output.contains("complaint"));
        assert!(output.contains("Boot takes two minutes"));
    }

    #[test]
    fn test_rows_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_rows(&[sample_row()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["post_type"], "complaint");
        assert_eq!(value[0]["topic_cluster"], "3");
    }

    #[test]
    fn test_rows_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_rows(&[sample_row()]).unwrap();
        assert_eq!(output, "r1\tcomplaint");
    }

    #[test]
    fn test_empty_rows() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_rows(&[]).unwrap();
        assert!(output.contains("No rows"));
    }

    #[test]
    fn test_outcome_table_lists_failures() {
        let sink = MemoryQuarantine::new();
        let outcome = RecoveryChain::new(&sink).parse("not json at all");
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_outcome(&outcome).unwrap();
        assert!(output.contains("quarantined"));
        assert!(output.contains("strict failed"));
    }

    #[test]
    fn test_graph_formats() {
        let graph = FeedbackGraph::from_rows(&[sample_row()], GraphConfig::default());

        let table = Formatter::new(OutputFormat::Table, false)
            .format_graph(&graph, false)
            .unwrap();
        assert!(table.contains("topic:3"));
        assert!(table.contains("3 nodes, 2 edges"));

        let quiet = Formatter::new(OutputFormat::Quiet, false)
            .format_graph(&graph, false)
            .unwrap();
        assert!(quiet.contains("topic:3 -> post:r1"));

        let force = Formatter::new(OutputFormat::Json, false)
            .format_graph(&graph, true)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&force).unwrap();
        assert_eq!(value["links"].as_array().map(Vec::len), Some(2));
    }

    fn sample_batch() -> BatchResult {
        BatchResult {
            run_id: RunId::new(),
            model_name: "mock".to_string(),
            rows: vec![sample_row()],
            failures: Vec::new(),
            metrics: BatchMetrics::new(),
        }
    }

    #[test]
    fn test_run_json_is_one_document() {
        let batch = sample_batch();
        let graph = FeedbackGraph::from_rows(&batch.rows, GraphConfig::default());
        let formatter = Formatter::new(OutputFormat::Json, false);

        let output = formatter.format_run(&batch, Some(&graph)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["batch"]["rows"][0]["id"], "r1");
        assert_eq!(value["batch"]["model_name"], "mock");
        assert!(value["graph"]["nodes"].is_object());

        let alone = formatter.format_run(&batch, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&alone).unwrap();
        assert_eq!(value["rows"][0]["id"], "r1");
    }

    #[test]
    fn test_run_table_appends_graph() {
        let batch = sample_batch();
        let graph = FeedbackGraph::from_rows(&batch.rows, GraphConfig::default());
        let output = Formatter::new(OutputFormat::Table, false)
            .format_run(&batch, Some(&graph))
            .unwrap();
        assert!(output.contains("run "));
        assert!(output.contains("3 nodes, 2 edges"));
    }

    #[test]
    fn test_preview_truncates() {
        let long = "word ".repeat(20);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), CONTENT_PREVIEW_LEN + 3);
        assert_eq!(preview("a\nb"), "a b");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
