//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::metrics::BatchMetrics;
use crate::parser::RecoveryChain;
use crate::prompt::PromptBuilder;
use crate::types::{BatchResult, ExtractionFailure, ThreadOutcome};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use threadsift_domain::{ExtractionPrompt, FeedbackRow, LlmProvider, QuarantineSink, RunId, Thread};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;
use tracing::{debug, debug_span, info, info_span, warn, Instrument};

/// The Extractor turns discussion threads into feedback rows
///
/// Each thread is sent to the generative service once. Replies go through
/// the recovery chain; a failed call produces a row with no reply and
/// all-unknown fields instead of aborting the batch.
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: ExtractorConfig,
    model_name: String,
}

impl<L> Extractor<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a new Extractor
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Self {
        let model_name = llm_provider.model_name().to_string();
        Self {
            llm_provider: Arc::new(llm_provider),
            config,
            model_name,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Name of the model behind the provider
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Build the prompt for one thread
    pub fn prompt_for(&self, thread: &Thread) -> ExtractionPrompt {
        PromptBuilder::new(thread)
            .with_max_comments(self.config.max_comments)
            .build()
    }

    /// Send one thread to the service and return its raw reply
    pub async fn extract_thread(&self, thread: &Thread) -> Result<String, ExtractorError> {
        let prompt = self.prompt_for(thread);
        call_llm(Arc::clone(&self.llm_provider), prompt, &self.config, None).await
    }

    /// Extract and parse one thread
    pub async fn process_thread(
        &self,
        thread: &Thread,
        sink: Arc<dyn QuarantineSink>,
    ) -> ThreadOutcome {
        process(Arc::clone(&self.llm_provider), &self.config, thread, sink, None).await
    }

    /// Extract every thread in `threads`
    ///
    /// At most `max_concurrency` service calls are in flight at once, counting
    /// calls that outlived their timeout. The result holds exactly one row per
    /// input thread, in input order, and the sink is flushed before returning.
    pub async fn run_batch(
        &self,
        threads: &[Thread],
        sink: Arc<dyn QuarantineSink>,
    ) -> BatchResult {
        let run_id = RunId::new();
        let span = info_span!("batch", run_id = %run_id, threads = threads.len());

        async move {
            let start = Instant::now();
            info!(model = %self.model_name, "starting batch");

            let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
            let handles: Vec<_> = threads
                .iter()
                .cloned()
                .map(|thread| {
                    let llm = Arc::clone(&self.llm_provider);
                    let config = self.config.clone();
                    let sink = Arc::clone(&sink);
                    let semaphore = Arc::clone(&semaphore);
                    let span = debug_span!("thread", id = %thread.id);

                    tokio::spawn(
                        async move {
                            let permit = semaphore.acquire_owned().await.ok();
                            process(llm, &config, &thread, sink, permit).await
                        }
                        .instrument(span),
                    )
                })
                .collect();

            let mut metrics = BatchMetrics::new();
            let mut rows = Vec::with_capacity(threads.len());
            let mut failures = Vec::new();

            for (thread, handle) in threads.iter().zip(handles) {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(thread_id = %thread.id, error = %e, "worker task failed");
                        let combined = PromptBuilder::new(thread)
                            .with_max_comments(self.config.max_comments)
                            .combined_text();
                        failed_outcome(thread, combined, &ExtractorError::Worker(e.to_string()))
                    }
                };

                metrics.record_stage(outcome.stage);
                if outcome.quarantine_error.is_some() {
                    metrics.record_quarantine_write_failure();
                }
                if let Some(failure) = outcome.failure {
                    metrics.record_service_failure();
                    failures.push(failure);
                }
                rows.push(outcome.row);
            }

            if let Err(e) = sink.flush() {
                warn!(error = %e, "failed to flush quarantine sink");
            }

            metrics.runtime_ms = start.elapsed().as_millis() as u64;
            info!(
                threads = metrics.threads,
                decoded = metrics.decoded(),
                quarantined = metrics.quarantined,
                service_failures = metrics.service_failures,
                runtime_ms = metrics.runtime_ms,
                "batch complete"
            );

            BatchResult {
                run_id,
                model_name: self.model_name.clone(),
                rows,
                failures,
                metrics,
            }
        }
        .instrument(span)
        .await
    }
}

async fn process<L>(
    llm: Arc<L>,
    config: &ExtractorConfig,
    thread: &Thread,
    sink: Arc<dyn QuarantineSink>,
    permit: Option<OwnedSemaphorePermit>,
) -> ThreadOutcome
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let builder = PromptBuilder::new(thread).with_max_comments(config.max_comments);
    let combined = builder.combined_text();
    let prompt = builder.build();
    debug!(prompt_len = prompt.len(), "built prompt");

    let reply = match call_llm(llm, prompt, config, permit).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(thread_id = %thread.id, error = %e, "service call failed");
            return failed_outcome(thread, combined, &e);
        }
    };
    debug!(reply_len = reply.len(), "received reply");

    // Quarantine writes block on file I/O
    let parsed = tokio::task::spawn_blocking(move || {
        let outcome = RecoveryChain::new(sink.as_ref()).parse(&reply);
        (reply, outcome)
    })
    .await;

    match parsed {
        Ok((reply, outcome)) => ThreadOutcome {
            row: FeedbackRow::new(thread, combined, Some(reply), outcome.feedback),
            stage: outcome.stage,
            failure: None,
            quarantine_error: outcome.quarantine_error,
        },
        Err(e) => {
            warn!(thread_id = %thread.id, error = %e, "parse task failed");
            failed_outcome(thread, combined, &ExtractorError::Worker(e.to_string()))
        }
    }
}

fn failed_outcome(thread: &Thread, combined: String, error: &ExtractorError) -> ThreadOutcome {
    let outcome = RecoveryChain::absent();
    ThreadOutcome {
        row: FeedbackRow::new(thread, combined, None, outcome.feedback),
        stage: outcome.stage,
        failure: Some(ExtractionFailure {
            thread_id: thread.id.clone(),
            reason: error.to_string(),
        }),
        quarantine_error: None,
    }
}

/// Call the provider on a blocking thread, bounded by the configured timeout
///
/// `permit` is held until the provider returns, even when the timeout fires
/// first.
async fn call_llm<L>(
    llm: Arc<L>,
    prompt: ExtractionPrompt,
    config: &ExtractorConfig,
    permit: Option<OwnedSemaphorePermit>,
) -> Result<String, ExtractorError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    // LlmProvider is synchronous
    let call = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        llm.generate(&prompt)
            .map_err(|e| ExtractorError::Llm(e.to_string()))
    });

    match timeout(config.extraction_timeout(), call).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(ExtractorError::Llm(format!("Task join error: {}", e))),
        Err(_) => Err(ExtractorError::Timeout(config.extraction_timeout_secs)),
    }
}
