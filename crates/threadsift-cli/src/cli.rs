//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Threadsift - Turn discussion threads into structured product feedback.
#[derive(Debug, Parser)]
#[command(name = "threadsift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "THREADSIFT_CONFIG")]
    pub config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one line per record)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the recovery chain over one service reply
    Parse(ParseArgs),

    /// Print the prompt composed for a thread
    Prompt(PromptArgs),

    /// Extract feedback from a batch of threads
    Run(RunArgs),

    /// Build the feedback graph from previously extracted rows
    Graph(GraphArgs),
}

/// Where a command reads its JSON or text input from.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InputArgs {
    /// Input file
    #[arg(long)]
    pub file: Option<String>,

    /// Read input from stdin
    #[arg(long)]
    pub stdin: bool,
}

/// Arguments for the parse command.
#[derive(Debug, Parser)]
pub struct ParseArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Append undecodable replies to this log instead of discarding them
    #[arg(short, long)]
    pub quarantine: Option<String>,
}

/// Arguments for the prompt command.
#[derive(Debug, Parser)]
pub struct PromptArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Maximum comments to include
    #[arg(long)]
    pub max_comments: Option<usize>,
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Override the configured provider
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Override the configured model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum concurrent service calls
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Quarantine log path
    #[arg(short, long)]
    pub quarantine: Option<String>,

    /// Also print the feedback graph
    #[arg(long)]
    pub graph: bool,
}

/// Arguments for the graph command.
#[derive(Debug, Parser)]
pub struct GraphArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Emit the nodes/links view instead of the keyed graph
    #[arg(long)]
    pub force: bool,
}

/// Provider argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ProviderArg {
    /// Canned replies, no network
    Mock,
    /// Local Ollama server
    Ollama,
    /// OpenAI API
    Openai,
    /// Azure OpenAI deployment
    Azure,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ProviderArg> for crate::config::ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Mock => crate::config::ProviderKind::Mock,
            ProviderArg::Ollama => crate::config::ProviderKind::Ollama,
            ProviderArg::Openai => crate::config::ProviderKind::OpenAi,
            ProviderArg::Azure => crate::config::ProviderKind::Azure,
        }
    }
}
