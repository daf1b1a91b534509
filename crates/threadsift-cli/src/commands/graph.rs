//! Graph command implementation.

use crate::cli::GraphArgs;
use crate::commands::read_json;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use threadsift_domain::FeedbackRow;
use threadsift_graph::FeedbackGraph;
use tracing::info;

/// Execute the graph command.
pub fn execute_graph(args: GraphArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let rows: Vec<FeedbackRow> = read_json(&args.input)?;
    info!(rows = rows.len(), "building graph");

    let graph = FeedbackGraph::from_rows(&rows, config.graph);
    println!("{}", formatter.format_graph(&graph, args.force)?);
    Ok(())
}
