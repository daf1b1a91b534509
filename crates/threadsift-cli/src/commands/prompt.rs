//! Prompt command implementation.

use crate::cli::PromptArgs;
use crate::commands::read_json;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use threadsift_domain::Thread;
use threadsift_extractor::PromptBuilder;

/// Execute the prompt command.
pub fn execute_prompt(args: PromptArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let thread: Thread = read_json(&args.input)?;
    let max_comments = args.max_comments.unwrap_or(config.extractor.max_comments);

    let prompt = PromptBuilder::new(&thread)
        .with_max_comments(max_comments)
        .build();

    println!("{}", formatter.format_prompt(&prompt)?);
    Ok(())
}
