//! Threadsift CLI - Turn discussion threads into structured product feedback.

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use threadsift_cli::commands;
use threadsift_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref().map(Path::new))
        .context("failed to load configuration")?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Parse(args) => {
            commands::execute_parse(args, &formatter).context("parse failed")?;
        }
        Command::Prompt(args) => {
            commands::execute_prompt(args, &config, &formatter).context("prompt failed")?;
        }
        Command::Run(args) => {
            commands::execute_run(args, &config, &formatter)
                .await
                .context("batch run failed")?;
        }
        Command::Graph(args) => {
            commands::execute_graph(args, &config, &formatter).context("graph build failed")?;
        }
    }

    Ok(())
}
