//! Retry with exponential backoff, shared by the HTTP providers

use crate::LlmError;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Run `op` up to `max_attempts` times, sleeping `base_delay * 2^n` between
/// attempts. Non-retryable errors are returned immediately.
pub(crate) async fn with_backoff<F, Fut, T>(
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                debug!(attempt = attempts + 1, error = %e, "LLM call failed");
                last_error = Some(e);
            }
        }

        attempts += 1;
        if attempts < max_attempts {
            let delay = base_delay * 2u32.pow(attempts - 1);
            tokio::time::sleep(delay).await;
        }
    }

    Err(last_error.unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
}
