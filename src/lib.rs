//! # raincheck
//!
//! Screenplay analysis report generator: PDF in, LLM-backed analysis out,
//! PDF report back.
//!
//! ## Why this crate?
//!
//! Script coverage is slow and expensive to produce by hand. raincheck runs
//! a fixed battery of producer-facing analyses — logline, genre, keywords,
//! synopsis, scoring, plot assessment, character profiling, box-office
//! outlook — over the full text of a screenplay and lays the answers out as
//! a deliverable PDF. The core is a library; the bundled `raincheck` binary
//! is one thin presentation layer over it, and a GUI or web front-end can be
//! another.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract   pdf-extract pulls the full text (CPU-bound, spawn_blocking)
//!  ├─ 2. Run       one chat-completion call per catalog section, in order
//!  ├─ 3. Sanitize  strip Markdown control tokens from each answer
//!  └─ 4. Report    genpdf lays out title + sections, paginating automatically
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use raincheck::{generate_report, AnalysisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from OPENAI_API_KEY
//!     let pdf = std::fs::read("screenplay.pdf")?;
//!     let config = AnalysisConfig::default();
//!     let output = generate_report(&pdf, &config).await?;
//!     std::fs::write("screenplay-report.pdf", &output.report_pdf)?;
//!     println!("{}", output.analysis.get("Logline").unwrap_or("-"));
//!     eprintln!("tokens: {} in / {} out",
//!         output.stats.total_input_tokens,
//!         output.stats.total_output_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `raincheck` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! raincheck = { version = "0.4", default-features = false }
//! ```
//!
//! ## Cost model
//!
//! One run is nine completion calls — three capped at 200 output tokens,
//! six at 700 — against the configured model (default `gpt-4o-mini`).
//! Calls are strictly sequential by default, which bounds the request rate;
//! set `concurrency` above 1 to trade burstier quota use for wall-clock time.
//! A run that fails or is cancelled produces no partial report.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod cancel;
pub mod catalog;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{
    analyze, analyze_sync, analyze_with_cancel, generate_report, generate_report_with_cancel,
};
pub use cancel::CancelToken;
pub use catalog::{AnalysisSpec, PromptTemplate, SectionSpec};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::RaincheckError;
pub use output::{AnalysisOutput, AnalysisResult, AnalysisStats, ReportOutput, SectionResult};
pub use pipeline::extract::extract_text;
pub use pipeline::llm::{Completion, CompletionClient, CompletionOptions, OpenAiClient};
pub use pipeline::report::{load_fonts, render as render_report};
pub use pipeline::runner::run;
pub use pipeline::sanitize::sanitize;
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
