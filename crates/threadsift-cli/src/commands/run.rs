//! Run command implementation.

use crate::cli::RunArgs;
use crate::commands::read_json;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::provider::AnyProvider;
use std::path::PathBuf;
use std::sync::Arc;
use threadsift_domain::Thread;
use threadsift_extractor::{BatchResult, Extractor, ExtractorConfig, FileQuarantine};
use threadsift_graph::FeedbackGraph;
use tracing::info;

/// Execute the run command.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let threads: Vec<Thread> = read_json(&args.input)?;
    if threads.is_empty() {
        return Err(CliError::InvalidInput("No threads provided".to_string()));
    }

    let result = run_batch(&args, config, &threads).await?;
    let graph = args
        .graph
        .then(|| FeedbackGraph::from_rows(&result.rows, config.graph));
    println!("{}", formatter.format_run(&result, graph.as_ref())?);

    Ok(())
}

/// Apply command-line overrides on top of the configured extractor settings.
fn extractor_config(args: &RunArgs, config: &Config) -> Result<ExtractorConfig> {
    let mut extractor = config.extractor.clone();
    if let Some(concurrency) = args.concurrency {
        extractor.max_concurrency = concurrency;
    }
    if let Some(path) = &args.quarantine {
        extractor.quarantine_path = PathBuf::from(path);
    }
    extractor.validate()?;
    Ok(extractor)
}

async fn run_batch(args: &RunArgs, config: &Config, threads: &[Thread]) -> Result<BatchResult> {
    let mut llm = config.llm.clone();
    if let Some(provider) = args.provider {
        llm.provider = provider.into();
    }
    if let Some(model) = &args.model {
        llm.model = model.clone();
    }

    let extractor_config = extractor_config(args, config)?;
    let sink = Arc::new(FileQuarantine::open(&extractor_config.quarantine_path)?);
    let provider = AnyProvider::from_settings(&llm)?;

    info!(
        threads = threads.len(),
        model = %llm.model,
        quarantine = %sink.path().display(),
        "running batch"
    );

    let extractor = Extractor::new(provider, extractor_config);
    Ok(extractor.run_batch(threads, sink).await)
}
