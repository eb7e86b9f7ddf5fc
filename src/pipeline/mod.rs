//! Pipeline stages for screenplay analysis.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different completion backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ runner ──▶ sanitize ──▶ report
//! (pdf-extract) (catalog × llm) (markdown strip) (genpdf layout)
//! ```
//!
//! 1. [`extract`]  — PDF bytes → one plain-text screenplay string
//! 2. [`runner`]   — drive every catalog section through the completion
//!    client, strictly in order by default; the only stage with network I/O
//! 3. [`llm`]      — the completion-client seam and its OpenAI-backed
//!    implementation
//! 4. [`sanitize`] — strip Markdown control tokens from model answers before
//!    layout
//! 5. [`report`]   — lay the sections out as a paginated PDF buffer

pub mod extract;
pub mod llm;
pub mod report;
pub mod runner;
pub mod sanitize;
