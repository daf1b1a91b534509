//! Command implementations.

pub mod graph;
pub mod parse;
pub mod prompt;
pub mod run;

pub use self::graph::execute_graph;
pub use self::parse::execute_parse;
pub use self::prompt::execute_prompt;
pub use self::run::execute_run;

use crate::cli::InputArgs;
use crate::error::{CliError, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Read};

/// Read the command input from a file or stdin.
pub(crate) fn read_input(input: &InputArgs) -> Result<String> {
    if input.stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else if let Some(file_path) = &input.file {
        Ok(fs::read_to_string(file_path)?)
    } else {
        Err(CliError::InvalidInput(
            "Must specify either --file or --stdin".to_string(),
        ))
    }
}

/// Read and decode JSON input.
pub(crate) fn read_json<T: DeserializeOwned>(input: &InputArgs) -> Result<T> {
    let data = read_input(input)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use threadsift_domain::Thread;

    #[test]
    fn test_missing_input_source() {
        let result = read_input(&InputArgs::default());
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_read_json_threads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("threads.json");
        fs::write(
            &path,
            r#"[{"id": "a", "title": "t", "selftext": "body", "upvotes": 3, "topic_cluster": 1}]"#,
        )
        .unwrap();

        let input = InputArgs {
            file: Some(path.to_string_lossy().into_owned()),
            stdin: false,
        };
        let threads: Vec<Thread> = read_json(&input).unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].body_text(), "body");
        assert_eq!(threads[0].score, 3);
    }
}
