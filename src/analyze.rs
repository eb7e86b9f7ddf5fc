//! Full-run entry points: PDF bytes in, analysis (and report) out.
//!
//! These functions wire the pipeline stages together for the common case —
//! the standard catalog and the environment-configured OpenAI client.
//! Callers needing a custom catalog, their own
//! [`CompletionClient`](crate::pipeline::llm::CompletionClient), or
//! piecewise control can use [`crate::pipeline::runner::run`] and
//! [`crate::pipeline::report`] directly; every stage takes its context as
//! arguments and holds no state across calls.

use crate::cancel::CancelToken;
use crate::catalog::AnalysisSpec;
use crate::config::AnalysisConfig;
use crate::error::RaincheckError;
use crate::output::{AnalysisOutput, AnalysisStats, ReportOutput};
use crate::pipeline::llm::OpenAiClient;
use crate::pipeline::{extract, report, runner};
use std::time::Instant;
use tracing::info;

/// Analyse a screenplay PDF: extract its text and run the standard catalog.
///
/// This is the primary library entry point. The credential is read from
/// `OPENAI_API_KEY`; its absence surfaces as [`RaincheckError::Auth`] on the
/// first completion call, before any request is issued.
///
/// # Errors
/// * [`RaincheckError::Extraction`] — the byte stream is not a readable PDF
/// * [`RaincheckError::EmptyScreenplay`] — the PDF has no text layer
/// * any completion-client error, propagated unmodified
pub async fn analyze(
    pdf_bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, RaincheckError> {
    analyze_with_cancel(pdf_bytes, config, &CancelToken::new()).await
}

/// [`analyze`], with a caller-held cancellation token.
pub async fn analyze_with_cancel(
    pdf_bytes: &[u8],
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> Result<AnalysisOutput, RaincheckError> {
    let total_start = Instant::now();
    info!("Starting screenplay analysis ({} PDF bytes)", pdf_bytes.len());

    // ── Step 1: Extract text ─────────────────────────────────────────────
    // pdf-extract is CPU-bound; keep it off the async hot path.
    let extract_start = Instant::now();
    let bytes = pdf_bytes.to_vec();
    let text = tokio::task::spawn_blocking(move || extract::extract_text(&bytes))
        .await
        .map_err(|e| RaincheckError::Internal(format!("extraction task panicked: {e}")))??;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    if text.trim().is_empty() {
        return Err(RaincheckError::EmptyScreenplay);
    }
    info!(
        "Extracted {} chars in {}ms",
        text.len(),
        extract_duration_ms
    );

    // ── Step 2: Build the client ─────────────────────────────────────────
    // Explicit config beats the environment; from_env falls back to
    // OPENAI_BASE_URL and then the public endpoint.
    let client = match &config.api_base {
        Some(base) => OpenAiClient::new(
            std::env::var("OPENAI_API_KEY").ok(),
            config.model.clone(),
            base.clone(),
            config.api_timeout_secs,
        )?,
        None => OpenAiClient::from_env(&config.model, config.api_timeout_secs)?,
    };

    // ── Step 3: Run the catalog ──────────────────────────────────────────
    let spec = AnalysisSpec::standard();
    let llm_start = Instant::now();
    let analysis = runner::run(&text, &spec, &client, config, cancel).await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    // ── Step 4: Compute stats ────────────────────────────────────────────
    let stats = AnalysisStats {
        sections: analysis.len(),
        total_input_tokens: analysis.iter().map(|s| s.input_tokens as u64).sum(),
        total_output_tokens: analysis.iter().map(|s| s.output_tokens as u64).sum(),
        extract_duration_ms,
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Analysis complete: {} sections, {}ms total",
        stats.sections, stats.total_duration_ms
    );

    Ok(AnalysisOutput { analysis, stats })
}

/// Analyse a screenplay PDF and render the result as a PDF report.
///
/// The report buffer comes back fully materialised; persistence and file
/// naming stay with the caller.
pub async fn generate_report(
    pdf_bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<ReportOutput, RaincheckError> {
    generate_report_with_cancel(pdf_bytes, config, &CancelToken::new()).await
}

/// [`generate_report`], with a caller-held cancellation token.
///
/// Fonts are loaded before the analysis starts: a missing font file fails
/// the run up front instead of after nine completion calls' worth of quota.
pub async fn generate_report_with_cancel(
    pdf_bytes: &[u8],
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> Result<ReportOutput, RaincheckError> {
    let fonts = report::load_fonts(&config.font_dir)?;
    let output = analyze_with_cancel(pdf_bytes, config, cancel).await?;
    let report_pdf = report::render(&config.report_title, &output.analysis, fonts)?;

    Ok(ReportOutput {
        analysis: output.analysis,
        stats: output.stats,
        report_pdf,
    })
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    pdf_bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, RaincheckError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RaincheckError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(analyze(pdf_bytes, config))
}
