//! Parse command implementation.

use crate::cli::ParseArgs;
use crate::commands::read_input;
use crate::error::Result;
use crate::output::Formatter;
use threadsift_extractor::{FileQuarantine, MemoryQuarantine, ParseOutcome, RecoveryChain};

/// Execute the parse command.
pub fn execute_parse(args: ParseArgs, formatter: &Formatter) -> Result<()> {
    let raw = read_input(&args.input)?;
    let outcome = parse_reply(&raw, args.quarantine.as_deref())?;
    println!("{}", formatter.format_outcome(&outcome)?);
    Ok(())
}

/// Run the recovery chain, quarantining into `quarantine` when given.
pub(crate) fn parse_reply(raw: &str, quarantine: Option<&str>) -> Result<ParseOutcome> {
    match quarantine {
        Some(path) => {
            let sink = FileQuarantine::open(path)?;
            let outcome = RecoveryChain::new(&sink).parse(raw);
            sink.close()?;
            Ok(outcome)
        }
        None => {
            let sink = MemoryQuarantine::new();
            Ok(RecoveryChain::new(&sink).parse(raw))
        }
    }
}
