//! The analysis runner: drives every catalog section through the completion
//! client.
//!
//! ## Failure policy
//!
//! Fail-fast, no retries: the first failing completion call aborts the run
//! and its error propagates unmodified. No partial result object ever
//! escapes — callers see either a complete [`AnalysisResult`] (one entry per
//! catalog section, in catalog order) or an error. Retry would require
//! idempotence and rate-limit handling that belong to the caller.
//!
//! ## Sequential by default
//!
//! `concurrency = 1` issues calls strictly in catalog order, which bounds
//! the peak request rate against the API; total latency is then the sum of
//! the per-section latencies. The sections are independent, so callers may
//! opt into parallel dispatch — ordering of the result is catalog order
//! either way.

use crate::cancel::CancelToken;
use crate::catalog::{AnalysisSpec, SectionSpec};
use crate::config::AnalysisConfig;
use crate::error::RaincheckError;
use crate::output::{AnalysisResult, SectionResult};
use crate::pipeline::llm::{CompletionClient, CompletionOptions};
use crate::prompts;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run the full catalog against the client and collect a complete result.
///
/// # Errors
/// * [`RaincheckError::EmptyScreenplay`] — blank screenplay text
/// * [`RaincheckError::InvalidSpec`] — catalog fails validation
/// * [`RaincheckError::Cancelled`] — the token was cancelled mid-run
/// * any client error, propagated unmodified from the failing call
pub async fn run(
    screenplay_text: &str,
    spec: &AnalysisSpec,
    client: &dyn CompletionClient,
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> Result<AnalysisResult, RaincheckError> {
    if screenplay_text.trim().is_empty() {
        return Err(RaincheckError::EmptyScreenplay);
    }
    spec.validate()?;

    let system = config
        .system_instruction
        .as_deref()
        .unwrap_or(prompts::SYSTEM_INSTRUCTION);
    let fenced = prompts::fence_screenplay(screenplay_text, config.max_screenplay_chars);
    let total = spec.len();

    info!(
        "Running {} analysis sections (concurrency {})",
        total, config.concurrency
    );
    if let Some(cb) = &config.progress_callback {
        cb.on_analysis_start(total);
    }

    let result = if config.concurrency <= 1 {
        run_sequential(&fenced, system, spec, client, config, cancel, total).await?
    } else {
        run_concurrent(&fenced, system, spec, client, config, cancel, total).await?
    };

    if let Some(cb) = &config.progress_callback {
        cb.on_analysis_complete(total, result.len());
    }
    Ok(result)
}

/// One call per section, strictly in catalog order.
#[allow(clippy::too_many_arguments)]
async fn run_sequential(
    fenced: &str,
    system: &str,
    spec: &AnalysisSpec,
    client: &dyn CompletionClient,
    config: &AnalysisConfig,
    cancel: &CancelToken,
    total: usize,
) -> Result<AnalysisResult, RaincheckError> {
    let mut sections = Vec::with_capacity(total);

    for (index, section) in spec.sections().iter().enumerate() {
        if cancel.is_cancelled() {
            warn!("Analysis cancelled before section '{}'", section.name);
            return Err(RaincheckError::Cancelled {
                completed: index,
                total,
            });
        }
        if let Some(cb) = &config.progress_callback {
            cb.on_section_start(index, total, &section.name);
        }
        match complete_section(fenced, system, section, client, config).await {
            Ok(result) => {
                if let Some(cb) = &config.progress_callback {
                    cb.on_section_complete(index, total, &section.name, result.body.len());
                }
                sections.push(result);
            }
            Err(e) => {
                if let Some(cb) = &config.progress_callback {
                    cb.on_section_error(index, total, &section.name, e.to_string());
                }
                return Err(e);
            }
        }
    }

    Ok(AnalysisResult::new(sections))
}

/// Dispatch sections with bounded parallelism, then restore catalog order.
///
/// Cancellation is checked at dispatch time: sections not yet dispatched
/// when the token flips are skipped, and the run reports `Cancelled` once
/// everything in flight has settled. On failures the error with the lowest
/// catalog index wins, so the surfaced error is deterministic.
#[allow(clippy::too_many_arguments)]
async fn run_concurrent(
    fenced: &str,
    system: &str,
    spec: &AnalysisSpec,
    client: &dyn CompletionClient,
    config: &AnalysisConfig,
    cancel: &CancelToken,
    total: usize,
) -> Result<AnalysisResult, RaincheckError> {
    enum Outcome {
        Done(SectionResult),
        Skipped,
    }

    let settled: Vec<(usize, Result<Outcome, RaincheckError>)> =
        stream::iter(spec.sections().iter().enumerate().map(|(index, section)| {
            async move {
                if cancel.is_cancelled() {
                    return (index, Ok(Outcome::Skipped));
                }
                if let Some(cb) = &config.progress_callback {
                    cb.on_section_start(index, total, &section.name);
                }
                match complete_section(fenced, system, section, client, config).await {
                    Ok(result) => {
                        if let Some(cb) = &config.progress_callback {
                            cb.on_section_complete(index, total, &section.name, result.body.len());
                        }
                        (index, Ok(Outcome::Done(result)))
                    }
                    Err(e) => {
                        if let Some(cb) = &config.progress_callback {
                            cb.on_section_error(index, total, &section.name, e.to_string());
                        }
                        (index, Err(e))
                    }
                }
            }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    let mut ordered: Vec<Option<SectionResult>> = vec![None; total];
    let mut failures: Vec<(usize, RaincheckError)> = Vec::new();
    let mut skipped = 0usize;

    for (index, outcome) in settled {
        match outcome {
            Ok(Outcome::Done(result)) => ordered[index] = Some(result),
            Ok(Outcome::Skipped) => skipped += 1,
            Err(e) => failures.push((index, e)),
        }
    }

    if !failures.is_empty() {
        failures.sort_by_key(|(index, _)| *index);
        return Err(failures.remove(0).1);
    }
    if skipped > 0 {
        return Err(RaincheckError::Cancelled {
            completed: total - skipped,
            total,
        });
    }

    let sections = ordered
        .into_iter()
        .map(|slot| {
            slot.ok_or_else(|| {
                RaincheckError::Internal("section result missing after successful run".into())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalysisResult::new(sections))
}

/// Issue one completion call for one section.
async fn complete_section(
    fenced: &str,
    system: &str,
    section: &SectionSpec,
    client: &dyn CompletionClient,
    config: &AnalysisConfig,
) -> Result<SectionResult, RaincheckError> {
    let start = Instant::now();
    let prompt = (section.template)(fenced);
    let options = CompletionOptions {
        temperature: config.temperature,
        max_tokens: section.max_tokens,
    };

    debug!(
        "Section '{}': {} prompt chars, {} token budget",
        section.name,
        prompt.len(),
        section.max_tokens
    );

    let completion = client.complete(&prompt, system, &options).await?;

    // A syntactically valid response with nothing in it is still a failure;
    // an empty section would silently hollow out the report.
    if completion.content.trim().is_empty() {
        return Err(RaincheckError::Api {
            message: format!("empty completion for section '{}'", section.name),
        });
    }

    let duration = start.elapsed();
    debug!(
        "Section '{}': {} in / {} out tokens, {:?}",
        section.name, completion.prompt_tokens, completion.completion_tokens, duration
    );

    Ok(SectionResult {
        name: section.name.clone(),
        body: completion.content,
        input_tokens: completion.prompt_tokens,
        output_tokens: completion.completion_tokens,
        duration_ms: duration.as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::Completion;
    use async_trait::async_trait;

    struct BlankAnswerClient;

    #[async_trait]
    impl CompletionClient for BlankAnswerClient {
        async fn complete(
            &self,
            _prompt: &str,
            _system: &str,
            _options: &CompletionOptions,
        ) -> Result<Completion, RaincheckError> {
            Ok(Completion {
                content: "   \n".into(),
                prompt_tokens: 1,
                completion_tokens: 0,
            })
        }
    }

    #[tokio::test]
    async fn blank_answers_are_api_errors() {
        let spec = AnalysisSpec::standard();
        let config = AnalysisConfig::default();
        let cancel = CancelToken::new();
        let err = run("FADE IN.", &spec, &BlankAnswerClient, &config, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, RaincheckError::Api { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn empty_screenplay_is_rejected() {
        let spec = AnalysisSpec::standard();
        let config = AnalysisConfig::default();
        let cancel = CancelToken::new();
        let err = run("  \n ", &spec, &BlankAnswerClient, &config, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, RaincheckError::EmptyScreenplay));
    }
}
